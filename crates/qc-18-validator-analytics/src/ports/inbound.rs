//! Driving Ports (API - Inbound)

use crate::domain::{ActiveSetChangeReport, ParticipationReport, PerformanceReport, ValidatorId};
use crate::error::{AnalyticsError, AnalyticsResult};
use async_trait::async_trait;
use tokio::sync::watch;

/// Per-request context carrying the caller's cancellation signal
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    cancel: Option<watch::Receiver<bool>>,
}

impl RequestContext {
    /// Context that is never cancelled
    pub fn background() -> Self {
        Self::default()
    }

    /// Context cancelled once `true` is sent on the channel
    pub fn with_cancellation(cancel: watch::Receiver<bool>) -> Self {
        Self {
            cancel: Some(cancel),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// `Err(Cancelled)` once the caller gave up
    pub fn ensure_active(&self) -> AnalyticsResult<()> {
        if self.is_cancelled() {
            return Err(AnalyticsError::Cancelled);
        }
        Ok(())
    }
}

/// Validator analytics API
///
/// Driving port consumed by the HTTP gateway. State identifiers arrive as
/// raw text and are parsed by the implementation.
#[async_trait]
pub trait ValidatorAnalyticsApi: Send + Sync {
    /// Participation for the epoch of the identified state
    async fn participation(
        &self,
        ctx: RequestContext,
        state_id: &str,
    ) -> AnalyticsResult<ParticipationReport>;

    /// Activations, exits, slashings and ejections at the epoch of the
    /// identified state
    async fn active_set_changes(
        &self,
        ctx: RequestContext,
        state_id: &str,
    ) -> AnalyticsResult<ActiveSetChangeReport>;

    /// Per-validator performance against the head state
    async fn performance(
        &self,
        ctx: RequestContext,
        ids: Vec<ValidatorId>,
    ) -> AnalyticsResult<PerformanceReport>;
}
