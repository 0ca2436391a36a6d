//! Entitlement engine: the gate every paid feature use passes through.
//!
//! The engine owns the [`EntitlementState`] snapshot exclusively and
//! coordinates three collaborators injected at construction: a
//! [`StateStore`] for persistence, an [`AdPresenter`] for rewarded-ad
//! presentation, and a [`Clock`] for day-rollover decisions. UI layers
//! only read derived summaries through the accessors here.
//!
//! Callers are expected to serialize `request_feature_use` calls (one in
//! flight per client); the engine provides no internal mutual exclusion.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ads::{AdPresenter, RewardOutcome};
use crate::analytics::{AnalysisKind, AnalyticsEvent, EventSink};
use crate::catalog;
use crate::clock::Clock;
use crate::policy;
use crate::state::{EntitlementState, StatusSummary};
use crate::store::StateStore;

/// Why a feature-use request was denied. Routine outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Daily quota exhausted (free) or credits at zero (premium).
    LimitReached,
    /// The user declined the ad prompt or closed the ad unrewarded.
    AdDismissed,
}

/// How a granted feature use was covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantKind {
    /// Install-day ad-free allowance.
    FreeTrial,
    /// Rewarded ad watched through.
    AdRewarded,
    /// Ad infrastructure failed; granted anyway (fail-open).
    AdFailOpen,
    /// Premium credit debited.
    PremiumCredit,
}

/// Result of [`EntitlementEngine::request_feature_use`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageOutcome {
    Granted(GrantKind),
    Denied(DenialReason),
}

impl UsageOutcome {
    pub fn allowed(&self) -> bool {
        matches!(self, UsageOutcome::Granted(_))
    }
}

/// Programmer errors from the purchase ledger. Policy denials never
/// surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown package id: {0}")]
    UnknownPackage(String),
    #[error("Credit packages require an active premium subscription")]
    PremiumRequired,
}

pub struct EntitlementEngine {
    state: EntitlementState,
    store: Box<dyn StateStore>,
    presenter: Arc<dyn AdPresenter>,
    clock: Box<dyn Clock>,
    sink: Arc<dyn EventSink>,
}

impl EntitlementEngine {
    /// Load persisted state (or fix fresh-install defaults), normalize the
    /// daily counters, and prepare the first ad opportunistically.
    pub async fn initialize(
        store: Box<dyn StateStore>,
        presenter: Arc<dyn AdPresenter>,
        clock: Box<dyn Clock>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let today = clock.today();
        let state = match store.load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                // First run: persist immediately so install_date is fixed.
                let state = EntitlementState::new(today);
                if let Err(e) = store.save(&state) {
                    warn!("Failed to persist initial entitlement state: {}", e);
                }
                info!(install_date = %today, "Fresh install, entitlement state created");
                state
            }
            Err(e) => {
                warn!("Failed to load entitlement state, using defaults: {}", e);
                EntitlementState::new(today)
            }
        };

        let mut engine = Self {
            state,
            store,
            presenter,
            clock,
            sink,
        };
        engine.check_daily_reset();

        engine.sink.track(AnalyticsEvent::AppStart {
            is_premium: engine.state.is_premium,
            credits: engine.state.credits,
        });
        engine.presenter.preload().await;

        engine
    }

    /// Mark the engine as running inside the native shell.
    pub fn set_native(&mut self, native: bool) {
        if self.state.is_native != native {
            self.state.is_native = native;
            self.persist();
        }
    }

    /// Reset the today-counters when the calendar day has changed.
    ///
    /// Runs before every policy evaluation, not only at startup: the
    /// process may stay resident across a midnight boundary.
    pub fn check_daily_reset(&mut self) {
        let today = self.clock.today();
        if self.state.last_usage_date != today {
            self.state.reset_daily_counters(today);
            self.persist();
            info!(%today, "Daily usage counters reset");
        }
    }

    /// Decide whether a gated feature use may proceed, interposing a
    /// rewarded ad when policy requires one.
    ///
    /// State is mutated only after the awaited ad outcome resolves, and
    /// persisted before success is reported.
    pub async fn request_feature_use(&mut self) -> UsageOutcome {
        self.check_daily_reset();
        let today = self.clock.today();

        if !policy::can_use_feature(&self.state, today) {
            self.sink.track(AnalyticsEvent::LimitReached {
                today_usage: self.state.today_usage,
            });
            debug!(today_usage = self.state.today_usage, "Feature use denied: limit reached");
            return UsageOutcome::Denied(DenialReason::LimitReached);
        }

        if self.state.is_premium {
            // can_use_feature guarantees credits > 0 here.
            self.state.credits -= 1;
            self.state.today_usage += 1;
            self.state.total_analyses += 1;
            self.persist();
            self.track_completed(AnalysisKind::Premium);
            debug!(credits = self.state.credits, "Premium feature use, credit debited");
            return UsageOutcome::Granted(GrantKind::PremiumCredit);
        }

        if policy::needs_ad(&self.state, today) {
            let remaining = policy::remaining_today(&self.state, today);
            if !self.presenter.confirm(remaining) {
                self.sink.track(AnalyticsEvent::AdSkipped);
                debug!("Ad prompt declined, request aborted");
                return UsageOutcome::Denied(DenialReason::AdDismissed);
            }

            match self.presenter.show_rewarded().await {
                RewardOutcome::Rewarded => {
                    self.state.today_usage += 1;
                    self.state.today_ads_watched += 1;
                    self.state.total_analyses += 1;
                    self.persist();
                    self.sink
                        .track(AnalyticsEvent::AdImpression { ad_type: "rewarded" });
                    self.track_completed(AnalysisKind::WithAd);
                    self.maybe_show_interstitial().await;
                    self.presenter.preload().await;
                    UsageOutcome::Granted(GrantKind::AdRewarded)
                }
                RewardOutcome::DismissedWithoutReward => {
                    self.sink.track(AnalyticsEvent::AdSkipped);
                    debug!("Rewarded ad dismissed without reward");
                    UsageOutcome::Denied(DenialReason::AdDismissed)
                }
                RewardOutcome::PresentationFailed => {
                    // Ad infrastructure failure must never block the
                    // feature: grant without counting an ad watch.
                    warn!("Rewarded ad presentation failed, granting feature use");
                    self.state.today_usage += 1;
                    self.state.total_analyses += 1;
                    self.persist();
                    self.track_completed(AnalysisKind::AdFailOpen);
                    self.presenter.preload().await;
                    UsageOutcome::Granted(GrantKind::AdFailOpen)
                }
            }
        } else {
            self.state.today_usage += 1;
            self.state.total_analyses += 1;
            self.persist();
            self.track_completed(AnalysisKind::FreeTrial);
            debug!(today_usage = self.state.today_usage, "Install-day free feature use");
            UsageOutcome::Granted(GrantKind::FreeTrial)
        }
    }

    /// Uses left today: credits for premium, quota remainder for free.
    pub fn remaining_today(&self) -> u32 {
        policy::remaining_today(&self.state, self.clock.today())
    }

    pub fn is_premium_user(&self) -> bool {
        self.state.is_premium
    }

    /// Derived status view for UI surfaces.
    pub fn status_summary(&self) -> StatusSummary {
        let today = self.clock.today();
        StatusSummary {
            is_premium: self.state.is_premium,
            credits: self.state.credits,
            is_first_day: policy::is_first_day(&self.state, today),
            today_usage: self.state.today_usage,
            today_ads_watched: self.state.today_ads_watched,
            remaining: policy::remaining_today(&self.state, today),
            needs_ad: policy::needs_ad(&self.state, today),
            total_analyses: self.state.total_analyses,
            premium_package_id: self.state.premium_package_id.clone(),
            premium_expiry: self.state.premium_expiry,
        }
    }

    /// Activate a premium tier: repeated activation adds credits and
    /// overwrites the package id and expiry, it does not stack.
    pub fn activate_premium(&mut self, package_id: &str) -> Result<(), EngineError> {
        let pkg = catalog::premium_package(package_id)
            .ok_or_else(|| EngineError::UnknownPackage(package_id.to_string()))?;

        self.state.is_premium = true;
        self.state.premium_package_id = Some(pkg.id.to_string());
        self.state.credits += pkg.credits;
        self.state.premium_expiry =
            Some(self.clock.now() + chrono::Duration::days(i64::from(pkg.months) * 30));
        self.persist();

        self.sink.track(AnalyticsEvent::Purchase {
            item_id: pkg.id.to_string(),
            value: pkg.price,
            credits: pkg.credits,
        });
        info!(package = pkg.id, credits = self.state.credits, "Premium activated");
        Ok(())
    }

    /// Add credits unconditionally. Hosts reconciling against a backend
    /// subscription record call this with the server's answer.
    pub fn add_credits(&mut self, amount: u32) {
        self.state.credits += amount;
        self.persist();
        debug!(amount, total = self.state.credits, "Credits added");
    }

    /// Buy a credit top-up package. Restricted to premium accounts at
    /// this level; the underlying ledger add is unconditional.
    pub fn purchase_credit_package(&mut self, package_id: &str) -> Result<(), EngineError> {
        if !self.state.is_premium {
            return Err(EngineError::PremiumRequired);
        }
        let pkg = catalog::credit_package(package_id)
            .ok_or_else(|| EngineError::UnknownPackage(package_id.to_string()))?;

        self.state.credits += pkg.credits;
        self.persist();

        self.sink.track(AnalyticsEvent::Purchase {
            item_id: pkg.id.to_string(),
            value: pkg.price,
            credits: pkg.credits,
        });
        info!(package = pkg.id, total = self.state.credits, "Credit package purchased");
        Ok(())
    }

    /// Debug-only full wipe: clears the persisted snapshot and restarts
    /// from fresh-install defaults dated today.
    pub fn reset_all(&mut self) {
        if let Err(e) = self.store.reset() {
            warn!("Failed to clear persisted entitlement state: {}", e);
        }
        self.state = EntitlementState::new(self.clock.today());
        self.persist();
        info!("Entitlement state reset");
    }

    /// Debug helper: force a day rollover without touching the clock.
    pub fn simulate_new_day(&mut self) {
        self.state.last_usage_date = self.clock.today() - chrono::Days::new(1);
        self.check_daily_reset();
    }

    /// Persist the snapshot. Failures are logged and swallowed; the
    /// in-memory state stays authoritative for the session.
    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.state) {
            warn!("Failed to persist entitlement state: {}", e);
        }
    }

    fn track_completed(&self, kind: AnalysisKind) {
        self.sink.track(AnalyticsEvent::AnalysisCompleted {
            kind,
            today_usage: self.state.today_usage,
            total_analyses: self.state.total_analyses,
        });
    }

    /// Show a full-screen interstitial every N-th lifetime use.
    /// Best-effort: presentation errors are ignored.
    async fn maybe_show_interstitial(&self) {
        if self.state.is_premium {
            return;
        }
        if self.state.total_analyses % policy::INTERSTITIAL_INTERVAL != 0 {
            return;
        }
        match self.presenter.show_interstitial().await {
            Ok(()) => {
                self.sink
                    .track(AnalyticsEvent::AdImpression { ad_type: "interstitial" });
            }
            Err(e) => debug!("Interstitial skipped: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ads::SimulatedAdPresenter;
    use crate::analytics::testing::RecordingSink;
    use crate::clock::FixedClock;
    use crate::policy::{DAILY_LIMIT, FIRST_DAY_NO_AD, FIRST_DAY_TOTAL};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    struct Harness {
        engine: EntitlementEngine,
        clock: Arc<FixedClock>,
        presenter: Arc<SimulatedAdPresenter>,
        sink: Arc<RecordingSink>,
    }

    /// Shared-clock wrapper so tests can advance the engine's calendar.
    struct SharedClock(Arc<FixedClock>);

    impl Clock for SharedClock {
        fn today(&self) -> NaiveDate {
            self.0.today()
        }
        fn now(&self) -> chrono::DateTime<chrono::Utc> {
            self.0.now()
        }
    }

    async fn harness_on(install: &str, presenter: SimulatedAdPresenter) -> Harness {
        let clock = Arc::new(FixedClock::new(date(install)));
        let presenter = Arc::new(presenter);
        let sink = Arc::new(RecordingSink::default());
        let engine = EntitlementEngine::initialize(
            Box::new(MemoryStore::new()),
            presenter.clone(),
            Box::new(SharedClock(clock.clone())),
            sink.clone(),
        )
        .await;
        Harness {
            engine,
            clock,
            presenter,
            sink,
        }
    }

    async fn fresh_harness() -> Harness {
        harness_on("2025-06-01", SimulatedAdPresenter::always_rewarded()).await
    }

    #[tokio::test]
    async fn test_fresh_install_fixes_install_date() {
        let h = fresh_harness().await;
        let summary = h.engine.status_summary();

        assert!(summary.is_first_day);
        assert_eq!(summary.remaining, FIRST_DAY_TOTAL);
        assert!(!summary.needs_ad);
        assert_eq!(h.sink.names().first().map(String::as_str), Some("app_start"));
    }

    #[tokio::test]
    async fn test_scenario_a_first_day_free_then_ad() {
        // E2E A: three ad-free grants, fourth goes through the ad path.
        let mut h = fresh_harness().await;

        for _ in 0..FIRST_DAY_NO_AD {
            assert_eq!(
                h.engine.request_feature_use().await,
                UsageOutcome::Granted(GrantKind::FreeTrial)
            );
        }
        assert_eq!(h.engine.status_summary().today_usage, 3);

        assert_eq!(
            h.engine.request_feature_use().await,
            UsageOutcome::Granted(GrantKind::AdRewarded)
        );
        let summary = h.engine.status_summary();
        assert_eq!(summary.today_usage, 4);
        assert_eq!(summary.today_ads_watched, 1);
    }

    #[tokio::test]
    async fn test_scenario_b_first_day_limit_denies_ninth_use() {
        let mut h = fresh_harness().await;

        for _ in 0..FIRST_DAY_TOTAL {
            assert!(h.engine.request_feature_use().await.allowed());
        }
        assert_eq!(h.engine.status_summary().today_usage, FIRST_DAY_TOTAL);

        // Ninth use: denied without any ad offered or state change.
        assert_eq!(
            h.engine.request_feature_use().await,
            UsageOutcome::Denied(DenialReason::LimitReached)
        );
        assert_eq!(h.engine.status_summary().today_usage, FIRST_DAY_TOTAL);
        assert!(h.sink.names().contains(&"analysis_limit_reached".to_string()));
    }

    #[tokio::test]
    async fn test_scenario_c_next_day_dismissed_ad_denies() {
        let mut h = fresh_harness().await;
        h.clock.advance_days(1);

        // Not first day anymore: the very first use is ad-gated.
        assert!(h.engine.status_summary().needs_ad);

        h.presenter
            .push_outcome(RewardOutcome::DismissedWithoutReward);
        assert_eq!(
            h.engine.request_feature_use().await,
            UsageOutcome::Denied(DenialReason::AdDismissed)
        );
        assert_eq!(h.engine.status_summary().today_usage, 0);
        assert!(h.sink.names().contains(&"ad_skipped".to_string()));
    }

    #[tokio::test]
    async fn test_scenario_d_premium_credits_drain_to_denial() {
        let mut h = fresh_harness().await;
        h.engine.activate_premium("monthly").unwrap();

        assert!(h.engine.is_premium_user());
        assert_eq!(h.engine.status_summary().credits, 150);

        // P1: credits never go negative; each grant debits exactly one.
        for i in 0..150 {
            assert_eq!(
                h.engine.request_feature_use().await,
                UsageOutcome::Granted(GrantKind::PremiumCredit),
                "use {} should debit a credit",
                i + 1
            );
        }
        assert_eq!(h.engine.status_summary().credits, 0);

        assert_eq!(
            h.engine.request_feature_use().await,
            UsageOutcome::Denied(DenialReason::LimitReached)
        );
        assert!(h.engine.is_premium_user());
        assert_eq!(h.engine.status_summary().credits, 0);
    }

    #[tokio::test]
    async fn test_daily_rollover_restores_standard_limit() {
        // P3: yesterday's usage resets, remaining is the standard limit.
        let mut h = fresh_harness().await;
        for _ in 0..5 {
            h.engine.request_feature_use().await;
        }
        assert_eq!(h.engine.status_summary().today_usage, 5);

        h.clock.advance_days(1);
        h.engine.check_daily_reset();

        let summary = h.engine.status_summary();
        assert_eq!(summary.today_usage, 0);
        assert_eq!(summary.remaining, DAILY_LIMIT);
        assert!(!summary.is_first_day);
    }

    #[tokio::test]
    async fn test_reset_happens_mid_session_not_only_at_startup() {
        let mut h = fresh_harness().await;
        h.engine.request_feature_use().await;
        h.clock.advance_days(1);

        // No explicit reset call: request_feature_use normalizes first.
        assert!(h.engine.request_feature_use().await.allowed());
        assert_eq!(h.engine.status_summary().today_usage, 1);
    }

    #[tokio::test]
    async fn test_fail_open_grants_exactly_once() {
        // P4: PresentationFailed still grants, usage increments once.
        let mut h = fresh_harness().await;
        h.clock.advance_days(1);

        h.presenter.push_outcome(RewardOutcome::PresentationFailed);
        assert_eq!(
            h.engine.request_feature_use().await,
            UsageOutcome::Granted(GrantKind::AdFailOpen)
        );

        let summary = h.engine.status_summary();
        assert_eq!(summary.today_usage, 1);
        // No ad was actually watched.
        assert_eq!(summary.today_ads_watched, 0);
    }

    #[tokio::test]
    async fn test_declined_confirmation_has_zero_side_effects() {
        let mut h = harness_on("2025-06-01", SimulatedAdPresenter::declining()).await;
        h.clock.advance_days(1);

        assert_eq!(
            h.engine.request_feature_use().await,
            UsageOutcome::Denied(DenialReason::AdDismissed)
        );
        let summary = h.engine.status_summary();
        assert_eq!(summary.today_usage, 0);
        assert_eq!(summary.today_ads_watched, 0);
        assert_eq!(summary.total_analyses, 0);
    }

    #[tokio::test]
    async fn test_interstitial_fires_every_third_use() {
        let mut h = fresh_harness().await;

        // Uses 1-3 are ad-free on the install day; the interstitial only
        // fires from rewarded grants, at total_analyses 6.
        for _ in 0..6 {
            assert!(h.engine.request_feature_use().await.allowed());
        }
        assert_eq!(h.presenter.interstitials_shown(), 1);
        assert_eq!(h.engine.status_summary().total_analyses, 6);
    }

    #[tokio::test]
    async fn test_premium_user_never_sees_ads() {
        let mut h = fresh_harness().await;
        h.engine.activate_premium("monthly").unwrap();

        for _ in 0..9 {
            assert_eq!(
                h.engine.request_feature_use().await,
                UsageOutcome::Granted(GrantKind::PremiumCredit)
            );
        }
        assert_eq!(h.engine.status_summary().today_ads_watched, 0);
        assert_eq!(h.presenter.interstitials_shown(), 0);
    }

    #[tokio::test]
    async fn test_activate_premium_repeats_add_credits_without_stacking() {
        let mut h = fresh_harness().await;
        h.engine.activate_premium("monthly").unwrap();
        h.engine.activate_premium("yearly").unwrap();

        let summary = h.engine.status_summary();
        assert_eq!(summary.credits, 150 + 2500);
        // Package id and expiry are overwritten, not stacked.
        assert_eq!(summary.premium_package_id.as_deref(), Some("yearly"));
    }

    #[tokio::test]
    async fn test_unknown_package_rejected_without_state_change() {
        let mut h = fresh_harness().await;

        let err = h.engine.activate_premium("lifetime").unwrap_err();
        assert!(matches!(err, EngineError::UnknownPackage(_)));
        assert!(!h.engine.is_premium_user());
        assert_eq!(h.engine.status_summary().credits, 0);
    }

    #[tokio::test]
    async fn test_credit_package_requires_premium() {
        let mut h = fresh_harness().await;

        assert!(matches!(
            h.engine.purchase_credit_package("credits-10"),
            Err(EngineError::PremiumRequired)
        ));

        h.engine.activate_premium("monthly").unwrap();
        h.engine.purchase_credit_package("credits-10").unwrap();
        assert_eq!(h.engine.status_summary().credits, 160);
    }

    #[tokio::test]
    async fn test_state_survives_reinitialization() {
        let store = Arc::new(MemoryStore::new());

        struct SharedStore(Arc<MemoryStore>);
        impl StateStore for SharedStore {
            fn load(&self) -> Result<Option<EntitlementState>, crate::store::StoreError> {
                self.0.load()
            }
            fn save(&self, state: &EntitlementState) -> Result<(), crate::store::StoreError> {
                self.0.save(state)
            }
            fn reset(&self) -> Result<(), crate::store::StoreError> {
                self.0.reset()
            }
        }

        let clock = Arc::new(FixedClock::new(date("2025-06-01")));
        let presenter = Arc::new(SimulatedAdPresenter::always_rewarded());
        let sink = Arc::new(RecordingSink::default());

        let mut engine = EntitlementEngine::initialize(
            Box::new(SharedStore(store.clone())),
            presenter.clone(),
            Box::new(SharedClock(clock.clone())),
            sink.clone(),
        )
        .await;
        engine.request_feature_use().await;
        engine.request_feature_use().await;

        // Simulated restart on a later day: install_date is preserved,
        // daily counters reset during initialize.
        clock.advance_days(3);
        let engine = EntitlementEngine::initialize(
            Box::new(SharedStore(store)),
            presenter,
            Box::new(SharedClock(clock)),
            sink,
        )
        .await;

        let summary = engine.status_summary();
        assert!(!summary.is_first_day);
        assert_eq!(summary.today_usage, 0);
        assert_eq!(summary.total_analyses, 2);
    }

    #[tokio::test]
    async fn test_reset_all_wipes_and_restarts_today() {
        let mut h = fresh_harness().await;
        h.engine.activate_premium("monthly").unwrap();
        h.engine.request_feature_use().await;
        h.clock.advance_days(10);

        h.engine.reset_all();

        let summary = h.engine.status_summary();
        assert!(!summary.is_premium);
        assert_eq!(summary.credits, 0);
        assert_eq!(summary.total_analyses, 0);
        // Fresh install dated today, not the original install day.
        assert!(summary.is_first_day);
    }

    #[tokio::test]
    async fn test_set_native_persists_platform_flag() {
        let mut h = fresh_harness().await;
        h.engine.set_native(true);
        assert!(h.engine.state.is_native);

        // No-op when unchanged.
        h.engine.set_native(true);
        assert!(h.engine.state.is_native);
    }

    #[tokio::test]
    async fn test_simulate_new_day_forces_rollover() {
        let mut h = fresh_harness().await;
        h.engine.request_feature_use().await;
        assert_eq!(h.engine.status_summary().today_usage, 1);

        h.engine.simulate_new_day();
        assert_eq!(h.engine.status_summary().today_usage, 0);
    }
}
