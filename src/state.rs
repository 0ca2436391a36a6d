//! Entitlement state models and derived status types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Persisted entitlement snapshot, one per installed client.
///
/// Serialized as camelCase JSON under a single storage key. Unknown fields
/// from older app versions are ignored on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementState {
    /// Running inside the native shell (real ads) vs. web (simulated).
    #[serde(default)]
    pub is_native: bool,

    /// Subscription active flag. Quota for premium users is governed by
    /// `credits`, never by the free daily-limit arithmetic.
    #[serde(default)]
    pub is_premium: bool,

    /// Premium usage credits, debited one per feature use.
    #[serde(default)]
    pub credits: u32,

    /// Which subscription tier was purchased, if any.
    #[serde(default)]
    pub premium_package_id: Option<String>,

    /// Subscription expiry. Stored for display and server reconciliation;
    /// the engine does not downgrade `is_premium` when it passes.
    #[serde(default)]
    pub premium_expiry: Option<DateTime<Utc>>,

    /// Calendar date of first run. Set exactly once, never overwritten.
    pub install_date: NaiveDate,

    /// Calendar date of the last daily counter reset.
    pub last_usage_date: NaiveDate,

    /// Feature uses counted today. Resets with `last_usage_date`.
    #[serde(default)]
    pub today_usage: u32,

    /// Rewarded ads watched today. Resets with `last_usage_date`.
    #[serde(default)]
    pub today_ads_watched: u32,

    /// Lifetime feature-use counter, monotonic. Drives the periodic
    /// interstitial cadence.
    #[serde(default)]
    pub total_analyses: u64,
}

impl EntitlementState {
    /// Fresh-install defaults. `install_date` and `last_usage_date` are
    /// fixed to the given calendar date.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            is_native: false,
            is_premium: false,
            credits: 0,
            premium_package_id: None,
            premium_expiry: None,
            install_date: today,
            last_usage_date: today,
            today_usage: 0,
            today_ads_watched: 0,
            total_analyses: 0,
        }
    }

    /// Zero the two today-counters and advance `last_usage_date`.
    ///
    /// The three fields always change together; callers persist afterwards.
    pub fn reset_daily_counters(&mut self, today: NaiveDate) {
        self.today_usage = 0;
        self.today_ads_watched = 0;
        self.last_usage_date = today;
    }
}

/// Read-only status view derived from the state plus today's date.
///
/// This is what UI surfaces (status bars, usage meters) consume; nothing
/// outside the engine reads or writes the raw state directly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub is_premium: bool,
    pub credits: u32,
    pub is_first_day: bool,
    pub today_usage: u32,
    pub today_ads_watched: u32,
    pub remaining: u32,
    pub needs_ad: bool,
    pub total_analyses: u64,
    pub premium_package_id: Option<String>,
    pub premium_expiry: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_defaults_fix_install_date() {
        let state = EntitlementState::new(date("2025-06-01"));

        assert_eq!(state.install_date, date("2025-06-01"));
        assert_eq!(state.last_usage_date, date("2025-06-01"));
        assert!(!state.is_premium);
        assert_eq!(state.credits, 0);
        assert_eq!(state.today_usage, 0);
        assert_eq!(state.total_analyses, 0);
    }

    #[test]
    fn test_daily_reset_clears_counters_together() {
        let mut state = EntitlementState::new(date("2025-06-01"));
        state.today_usage = 5;
        state.today_ads_watched = 2;
        state.total_analyses = 12;

        state.reset_daily_counters(date("2025-06-02"));

        assert_eq!(state.today_usage, 0);
        assert_eq!(state.today_ads_watched, 0);
        assert_eq!(state.last_usage_date, date("2025-06-02"));
        // Lifetime counter is untouched by the daily rollover.
        assert_eq!(state.total_analyses, 12);
    }

    #[test]
    fn test_snapshot_round_trips_camel_case() {
        let mut state = EntitlementState::new(date("2025-06-01"));
        state.is_premium = true;
        state.credits = 42;
        state.premium_package_id = Some("monthly".into());

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"installDate\""));
        assert!(json.contains("\"todayAdsWatched\""));

        let back: EntitlementState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_snapshot_tolerates_missing_optional_fields() {
        // Older snapshots may predate some counters.
        let json = r#"{"installDate":"2025-06-01","lastUsageDate":"2025-06-01"}"#;
        let state: EntitlementState = serde_json::from_str(json).unwrap();

        assert_eq!(state.today_usage, 0);
        assert_eq!(state.credits, 0);
        assert!(state.premium_expiry.is_none());
    }
}
