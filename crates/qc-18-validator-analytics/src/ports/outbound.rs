//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::{BeaconStateView, Epoch, StateId};
use crate::error::StateFetchError;
use async_trait::async_trait;

/// Source of beacon states, owned by the state-transition pipeline
#[async_trait]
pub trait StateProvider: Send + Sync {
    /// Resolve an identifier to a view over that state
    async fn resolve_state(&self, state_id: &StateId) -> Result<BeaconStateView, StateFetchError>;

    /// Latest finalized epoch
    async fn finalized_epoch(&self) -> Epoch;
}
