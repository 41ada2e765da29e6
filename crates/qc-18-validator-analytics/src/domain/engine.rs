//! Epoch analytics engine
//!
//! Stateless facade over the report computations. Operates on an owned
//! snapshot, never on the shared state.

use super::active_set::{self, ActiveSetChangeReport};
use super::participation::{self, ParticipationReport};
use super::performance::{self, PerformanceReport};
use super::state::ConsensusState;
use super::validator::ValidatorId;
use super::Epoch;
use crate::config::{AnalyticsConfig, ConfigError};
use crate::error::AnalyticsResult;

#[derive(Clone, Debug, Default)]
pub struct EpochAnalyticsEngine {
    config: AnalyticsConfig,
}

impl EpochAnalyticsEngine {
    /// Engine over a validated `config`
    pub fn new(config: AnalyticsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Epoch of `state` under the configured slots per epoch
    pub fn epoch_of(&self, state: &ConsensusState) -> Epoch {
        state.current_epoch(self.config.slots_per_epoch)
    }

    pub fn participation(
        &self,
        state: &ConsensusState,
        epoch: Epoch,
        finalized_epoch: Epoch,
    ) -> AnalyticsResult<ParticipationReport> {
        participation::compute(state, epoch, finalized_epoch, self.config.slots_per_epoch)
    }

    pub fn active_set_changes(
        &self,
        state: &ConsensusState,
        epoch: Epoch,
    ) -> ActiveSetChangeReport {
        active_set::compute(state, epoch, &self.config)
    }

    /// Performance over the previous epoch of `state`
    pub fn performance(
        &self,
        state: &ConsensusState,
        ids: &[ValidatorId],
    ) -> AnalyticsResult<PerformanceReport> {
        performance::compute(state, ids, self.config.slots_per_epoch)
    }
}
