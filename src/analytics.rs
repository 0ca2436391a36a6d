//! Best-effort analytics events.
//!
//! Events are dispatched after the primary state transition commits and
//! are never allowed to affect its outcome. The default sink writes
//! structured `tracing` events; hosts wire their own sink to forward to a
//! real analytics backend.

use serde::Serialize;

/// How a granted feature use was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    FreeTrial,
    WithAd,
    AdFailOpen,
    Premium,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::FreeTrial => "free_trial",
            AnalysisKind::WithAd => "with_ad",
            AnalysisKind::AdFailOpen => "ad_fail_open",
            AnalysisKind::Premium => "premium",
        }
    }
}

/// Analytics events emitted by the engine.
#[derive(Debug, Clone)]
pub enum AnalyticsEvent {
    AppStart {
        is_premium: bool,
        credits: u32,
    },
    AnalysisCompleted {
        kind: AnalysisKind,
        today_usage: u32,
        total_analyses: u64,
    },
    LimitReached {
        today_usage: u32,
    },
    AdSkipped,
    AdImpression {
        ad_type: &'static str,
    },
    Purchase {
        item_id: String,
        value: u32,
        credits: u32,
    },
}

/// Fire-and-forget event sink.
pub trait EventSink: Send + Sync {
    fn track(&self, event: AnalyticsEvent);
}

/// Sink that emits structured log events. Local-only, never fails.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn track(&self, event: AnalyticsEvent) {
        match event {
            AnalyticsEvent::AppStart { is_premium, credits } => {
                tracing::info!(is_premium, credits, "event: app_start");
            }
            AnalyticsEvent::AnalysisCompleted {
                kind,
                today_usage,
                total_analyses,
            } => {
                tracing::info!(
                    analysis_type = kind.as_str(),
                    today_usage,
                    total_analyses,
                    "event: analysis_completed"
                );
            }
            AnalyticsEvent::LimitReached { today_usage } => {
                tracing::info!(today_usage, "event: analysis_limit_reached");
            }
            AnalyticsEvent::AdSkipped => {
                tracing::info!(ad_type = "rewarded", "event: ad_skipped");
            }
            AnalyticsEvent::AdImpression { ad_type } => {
                tracing::info!(ad_type, "event: ad_impression");
            }
            AnalyticsEvent::Purchase {
                item_id,
                value,
                credits,
            } => {
                tracing::info!(%item_id, value, credits, "event: purchase");
            }
        }
    }
}

/// Sink that drops everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn track(&self, _event: AnalyticsEvent) {}
}
