//! Orbis Entitlement - usage metering and premium entitlements
//!
//! This library decides, per user action, whether a gated feature may be
//! used, whether a rewarded ad must be interposed first, and how credits
//! and subscription state are debited and persisted.
//!
//! ## Components
//!
//! - **State store**: single-key JSON snapshot, loaded at startup and
//!   written after every mutation
//! - **Quota policy**: pure decision functions over state + calendar date
//! - **Ad gate**: orchestrates an external [`AdPresenter`] and interprets
//!   its tri-state outcome (fail-open on infrastructure errors)
//! - **Purchase ledger**: premium activation and credit top-ups
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use orbis_entitlement::{
//!     EntitlementEngine, JsonFileStore, LogSink, SimulatedAdPresenter, SystemClock,
//! };
//!
//! # async fn run() {
//! let mut engine = EntitlementEngine::initialize(
//!     Box::new(JsonFileStore::default_location()),
//!     Arc::new(SimulatedAdPresenter::always_rewarded()),
//!     Box::new(SystemClock),
//!     Arc::new(LogSink),
//! )
//! .await;
//!
//! let outcome = engine.request_feature_use().await;
//! if outcome.allowed() {
//!     // proceed with the gated action
//! }
//! # }
//! ```

pub mod ads;
pub mod analytics;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod engine;
pub mod policy;
pub mod state;
pub mod store;

// Re-exports for convenience
pub use ads::{AdError, AdPresenter, RewardOutcome, SimulatedAdPresenter};
pub use analytics::{AnalyticsEvent, EventSink, LogSink, NullSink};
pub use catalog::{CreditPackage, PremiumPackage, CREDIT_PACKAGES, PREMIUM_PACKAGES};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{DenialReason, EngineError, EntitlementEngine, GrantKind, UsageOutcome};
pub use policy::{DailyLimit, DAILY_LIMIT, FIRST_DAY_NO_AD, FIRST_DAY_TOTAL, INTERSTITIAL_INTERVAL};
pub use state::{EntitlementState, StatusSummary};
pub use store::{JsonFileStore, MemoryStore, StateStore, StoreError};
