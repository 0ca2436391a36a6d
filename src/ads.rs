//! Ad presentation seam.
//!
//! The engine never talks to an ad SDK directly. A host supplies an
//! [`AdPresenter`]: the native shell wraps the real SDK, web and tests use
//! [`SimulatedAdPresenter`]. The engine cannot tell which is active.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

/// Result of a rewarded-ad presentation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardOutcome {
    /// The user watched through and earned the reward.
    Rewarded,
    /// The user closed the ad before the reward fired.
    DismissedWithoutReward,
    /// Infrastructure failure: no fill, network, SDK error. The engine
    /// fails open on this outcome.
    PresentationFailed,
}

/// Interstitial presentation errors. Always non-fatal to the caller.
#[derive(Debug, Error)]
pub enum AdError {
    #[error("Ad not ready")]
    NotReady,
    #[error("Presentation error: {0}")]
    Presentation(String),
}

/// External ad-presentation capability.
#[async_trait]
pub trait AdPresenter: Send + Sync {
    /// Synchronous yes/no gate shown before any rewarded ad. Declining
    /// aborts the flow with zero side effects.
    fn confirm(&self, remaining: u32) -> bool;

    /// Present a rewarded ad and wait for its outcome. One attempt per
    /// call; no retries.
    async fn show_rewarded(&self) -> RewardOutcome;

    /// Present a full-screen interstitial. Fired best-effort by the
    /// engine; errors are ignored.
    async fn show_interstitial(&self) -> Result<(), AdError>;

    /// Opportunistically prepare the next ad. Failures are non-fatal and
    /// swallowed by implementations.
    async fn preload(&self) {}
}

/// Scripted presenter for web mode and tests.
///
/// Pops outcomes from a queue; when the queue is empty every rewarded ad
/// is simulated as watched, matching the web platform's behavior of
/// granting simulated rewards.
#[derive(Debug, Default)]
pub struct SimulatedAdPresenter {
    outcomes: Mutex<VecDeque<RewardOutcome>>,
    confirm: bool,
    interstitials_shown: Mutex<u32>,
}

impl SimulatedAdPresenter {
    /// Presenter that confirms every prompt and rewards every ad.
    pub fn always_rewarded() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            confirm: true,
            interstitials_shown: Mutex::new(0),
        }
    }

    /// Presenter whose confirmation prompt is always declined.
    pub fn declining() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            confirm: false,
            interstitials_shown: Mutex::new(0),
        }
    }

    /// Queue an outcome for the next rewarded-ad presentation.
    pub fn push_outcome(&self, outcome: RewardOutcome) {
        self.outcomes.lock().push_back(outcome);
    }

    /// How many interstitials the engine has fired at this presenter.
    pub fn interstitials_shown(&self) -> u32 {
        *self.interstitials_shown.lock()
    }
}

#[async_trait]
impl AdPresenter for SimulatedAdPresenter {
    fn confirm(&self, _remaining: u32) -> bool {
        self.confirm
    }

    async fn show_rewarded(&self) -> RewardOutcome {
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or(RewardOutcome::Rewarded)
    }

    async fn show_interstitial(&self) -> Result<(), AdError> {
        *self.interstitials_shown.lock() += 1;
        Ok(())
    }
}
