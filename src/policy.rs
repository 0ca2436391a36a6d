//! Quota policy for feature-use gating.
//!
//! This module is the single source of truth for the free-tier quota
//! arithmetic. Everything here is a pure function over the state snapshot
//! plus the current calendar date, so day-rollover behavior is fully
//! deterministic under test.

use chrono::NaiveDate;

use crate::state::EntitlementState;

/// Total uses allowed on the install day (3 ad-free + 5 ad-gated).
pub const FIRST_DAY_TOTAL: u32 = 8;

/// Ad-free uses on the install day.
pub const FIRST_DAY_NO_AD: u32 = 3;

/// Daily uses on every day after the install day (all ad-gated).
pub const DAILY_LIMIT: u32 = 5;

/// A full-screen interstitial is shown after every N-th lifetime use.
pub const INTERSTITIAL_INTERVAL: u64 = 3;

/// Daily allowance for a given user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyLimit {
    /// Free tier: hard per-day cap.
    Limited(u32),
    /// Premium: no daily cap, credits gate usage instead.
    Unbounded,
}

/// Whether `today` is the calendar day of installation.
pub fn is_first_day(state: &EntitlementState, today: NaiveDate) -> bool {
    state.install_date == today
}

/// The applicable daily limit for `today`.
pub fn daily_limit(state: &EntitlementState, today: NaiveDate) -> DailyLimit {
    if state.is_premium {
        return DailyLimit::Unbounded;
    }
    if is_first_day(state, today) {
        DailyLimit::Limited(FIRST_DAY_TOTAL)
    } else {
        DailyLimit::Limited(DAILY_LIMIT)
    }
}

/// Uses left today: credits for premium, limit minus usage for free.
pub fn remaining_today(state: &EntitlementState, today: NaiveDate) -> u32 {
    match daily_limit(state, today) {
        DailyLimit::Unbounded => state.credits,
        DailyLimit::Limited(limit) => limit.saturating_sub(state.today_usage),
    }
}

/// Whether the next use must be preceded by a rewarded ad.
///
/// Premium never sees ads. Free users get `FIRST_DAY_NO_AD` ad-free uses
/// on the install day; every other use is ad-gated.
pub fn needs_ad(state: &EntitlementState, today: NaiveDate) -> bool {
    if state.is_premium {
        return false;
    }
    if !is_first_day(state, today) {
        return true;
    }
    state.today_usage >= FIRST_DAY_NO_AD
}

/// Whether a feature use may proceed at all (before any ad gating).
pub fn can_use_feature(state: &EntitlementState, today: NaiveDate) -> bool {
    if state.is_premium {
        return state.credits > 0;
    }
    match daily_limit(state, today) {
        DailyLimit::Unbounded => true,
        DailyLimit::Limited(limit) => state.today_usage < limit,
    }
}
