//! Validator Analytics Service
//!
//! Resolves the requested state, takes one snapshot of it and runs the
//! engine on the snapshot. The state lock is held only while copying, never
//! across an await, and waiting for it never parks the runtime thread.
//! Cancellation is observed between the steps.

use crate::config::{AnalyticsConfig, ConfigError};
use crate::domain::{
    ActiveSetChangeReport, ConsensusState, EpochAnalyticsEngine, ParticipationReport,
    PerformanceReport, StateId, ValidatorId,
};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::metrics;
use crate::ports::inbound::{RequestContext, ValidatorAnalyticsApi};
use crate::ports::outbound::StateProvider;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Analytics service over a state provider
pub struct AnalyticsService<P: StateProvider> {
    provider: Arc<P>,
    engine: EpochAnalyticsEngine,
}

impl<P: StateProvider> AnalyticsService<P> {
    pub fn new(provider: Arc<P>, config: AnalyticsConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            provider,
            engine: EpochAnalyticsEngine::new(config)?,
        })
    }

    pub fn engine(&self) -> &EpochAnalyticsEngine {
        &self.engine
    }

    /// Resolve and copy the identified state
    async fn snapshot(
        &self,
        ctx: &RequestContext,
        state_id: &StateId,
    ) -> AnalyticsResult<ConsensusState> {
        ctx.ensure_active()?;
        let view = self.provider.resolve_state(state_id).await?;
        ctx.ensure_active()?;
        let snapshot = view.snapshot_async().await?;
        ctx.ensure_active()?;
        debug!(
            "[qc-18] Snapshot of {} at slot {} ({})",
            state_id,
            snapshot.slot,
            snapshot.version()
        );
        Ok(snapshot)
    }
}

/// Log, count and pass through the outcome of one operation
fn observe<T>(
    operation: &'static str,
    started: Instant,
    result: AnalyticsResult<T>,
) -> AnalyticsResult<T> {
    metrics::record_request(operation, started.elapsed().as_secs_f64());
    if let Err(err) = &result {
        metrics::record_failure(operation, err.kind());
        match err {
            AnalyticsError::Cancelled => debug!("[qc-18] {} cancelled by caller", operation),
            e if e.is_client_error() => warn!("[qc-18] {} rejected: {}", operation, e),
            e => error!("[qc-18] {} failed: {}", operation, e),
        }
    }
    result
}

#[async_trait]
impl<P: StateProvider + 'static> ValidatorAnalyticsApi for AnalyticsService<P> {
    #[instrument(skip(self, ctx))]
    async fn participation(
        &self,
        ctx: RequestContext,
        state_id: &str,
    ) -> AnalyticsResult<ParticipationReport> {
        let started = Instant::now();
        let result: AnalyticsResult<ParticipationReport> = async {
            let id = StateId::parse(state_id)?;
            let state = self.snapshot(&ctx, &id).await?;
            let finalized_epoch = self.provider.finalized_epoch().await;
            let epoch = self.engine.epoch_of(&state);
            let report = self.engine.participation(&state, epoch, finalized_epoch)?;
            ctx.ensure_active()?;

            metrics::set_participation_rate(report.participation.global_participation_rate);
            info!(
                "[qc-18] Participation at epoch {}: {}/{} Gwei",
                epoch, report.participation.voted_ether, report.participation.eligible_ether
            );
            Ok(report)
        }
        .await;
        observe("participation", started, result)
    }

    #[instrument(skip(self, ctx))]
    async fn active_set_changes(
        &self,
        ctx: RequestContext,
        state_id: &str,
    ) -> AnalyticsResult<ActiveSetChangeReport> {
        let started = Instant::now();
        let result: AnalyticsResult<ActiveSetChangeReport> = async {
            let id = StateId::parse(state_id)?;
            let state = self.snapshot(&ctx, &id).await?;
            let epoch = self.engine.epoch_of(&state);
            let report = self.engine.active_set_changes(&state, epoch);
            ctx.ensure_active()?;

            info!(
                "[qc-18] Active set changes at epoch {}: +{} -{} slashed {} ejected {}",
                epoch,
                report.activated.len(),
                report.exited.len(),
                report.slashed.len(),
                report.ejected.len()
            );
            Ok(report)
        }
        .await;
        observe("active_set_changes", started, result)
    }

    #[instrument(skip(self, ctx, ids), fields(requested = ids.len()))]
    async fn performance(
        &self,
        ctx: RequestContext,
        ids: Vec<ValidatorId>,
    ) -> AnalyticsResult<PerformanceReport> {
        let started = Instant::now();
        let result: AnalyticsResult<PerformanceReport> = async {
            let state = self.snapshot(&ctx, &StateId::Head).await?;
            let report = self.engine.performance(&state, &ids)?;
            ctx.ensure_active()?;

            metrics::record_missing_validators(report.missing_validators.len());
            info!(
                "[qc-18] Performance at epoch {}: {} rows, {} missing",
                report.epoch,
                report.rows.len(),
                report.missing_validators.len()
            );
            Ok(report)
        }
        .await;
        observe("performance", started, result)
    }
}
