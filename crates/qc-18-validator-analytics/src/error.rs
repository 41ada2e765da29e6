//! Error types for the Validator Analytics subsystem
//!
//! Two layers:
//! - [`StateFetchError`]: the state collaborator could not produce a snapshot
//!   for an identifier. The reason is preserved so the gateway can answer
//!   with the matching status.
//! - [`AnalyticsError`]: everything raised by the view, the engine and the
//!   service.

use crate::domain::fork::ForkVersion;
use crate::domain::Epoch;
use thiserror::Error;

/// Failure to resolve a state identifier into a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateFetchError {
    /// No identifier supplied
    #[error("state_id is required")]
    MissingStateId,

    /// Identifier is not one of the accepted forms
    #[error("invalid state ID: {state_id}")]
    InvalidStateId { state_id: String },

    /// Identifier is well formed but no such state is known
    #[error("state not found: {state_id}")]
    NotFound { state_id: String },

    /// Requested slot is ahead of the head slot
    #[error("requested slot {requested} is in the future, head slot is {head}")]
    FutureSlot { requested: u64, head: u64 },

    /// The state store failed
    #[error("state store error: {reason}")]
    Store { reason: String },
}

/// Analytics subsystem errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// Fork-gated field read on a state of another fork
    #[error("{field} is not supported for {version} state")]
    UnsupportedForVersion {
        field: &'static str,
        version: ForkVersion,
    },

    /// Fork data variant does not match the declared version
    #[error("fork data mismatch: {version} cannot carry {layout} fields")]
    ForkDataMismatch {
        version: ForkVersion,
        layout: &'static str,
    },

    /// Epoch is neither the current nor the previous epoch of the state
    #[error("epoch {requested} is out of range for state at epoch {current}")]
    EpochOutOfRange { requested: Epoch, current: Epoch },

    /// Shared read lock could not be acquired in time
    #[error("timed out after {timeout_ms}ms waiting for state read lock")]
    LockTimeout { timeout_ms: u128 },

    /// Gwei sum would wrap
    #[error("balance overflow while summing {context}")]
    BalanceOverflow { context: &'static str },

    /// Caller cancelled the request
    #[error("request cancelled")]
    Cancelled,

    /// State could not be resolved
    #[error(transparent)]
    StateFetch(#[from] StateFetchError),
}

/// Result type for analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

impl AnalyticsError {
    /// Whether the failure is caused by caller input rather than the node.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::StateFetch(
                StateFetchError::MissingStateId
                    | StateFetchError::InvalidStateId { .. }
                    | StateFetchError::FutureSlot { .. }
                    | StateFetchError::NotFound { .. }
            ) | AnalyticsError::EpochOutOfRange { .. }
        )
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyticsError::UnsupportedForVersion { .. } => "unsupported_for_version",
            AnalyticsError::ForkDataMismatch { .. } => "fork_data_mismatch",
            AnalyticsError::EpochOutOfRange { .. } => "epoch_out_of_range",
            AnalyticsError::LockTimeout { .. } => "lock_timeout",
            AnalyticsError::BalanceOverflow { .. } => "balance_overflow",
            AnalyticsError::Cancelled => "cancelled",
            AnalyticsError::StateFetch(StateFetchError::MissingStateId) => "missing_state_id",
            AnalyticsError::StateFetch(StateFetchError::InvalidStateId { .. }) => {
                "invalid_state_id"
            }
            AnalyticsError::StateFetch(StateFetchError::NotFound { .. }) => "state_not_found",
            AnalyticsError::StateFetch(StateFetchError::FutureSlot { .. }) => "future_slot",
            AnalyticsError::StateFetch(StateFetchError::Store { .. }) => "state_store",
        }
    }
}
