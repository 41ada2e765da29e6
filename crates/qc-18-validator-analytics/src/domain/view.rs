//! Versioned state view
//!
//! Read side of the state shared with the state-transition pipeline. The
//! pipeline takes the write lock when it replaces state contents; this view
//! only ever takes the shared read lock, for no longer than one copy, and
//! hands out owned values so later mutation of the source can never reach a
//! value already returned.
//!
//! Fork-gated accessors check the version before touching the field and
//! keep two outcomes apart:
//! - wrong fork: `Err(AnalyticsError::UnsupportedForVersion)`
//! - right fork, list never populated: `Ok(None)`

use super::attestation::{ParticipationFlags, PendingAttestation};
use super::fork::ForkVersion;
use super::state::{ConsensusState, ForkData};
use super::validator::Validator;
use super::{Epoch, Gwei, Slot};
use crate::error::{AnalyticsError, AnalyticsResult};
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;
use std::time::Duration;

/// State shared between the pipeline (writer) and analytics (readers)
pub type SharedState = Arc<RwLock<ConsensusState>>;

/// Default bound on read lock acquisition
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// Retry interval for async lock acquisition
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// Read-only, fork-aware view over a [`SharedState`]
#[derive(Clone, Debug)]
pub struct BeaconStateView {
    inner: SharedState,
    slots_per_epoch: u64,
    lock_timeout: Duration,
}

impl BeaconStateView {
    pub fn new(inner: SharedState, slots_per_epoch: u64) -> Self {
        Self {
            inner,
            slots_per_epoch,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Wrap a state nobody else writes to
    pub fn from_state(state: ConsensusState, slots_per_epoch: u64) -> Self {
        Self::new(Arc::new(RwLock::new(state)), slots_per_epoch)
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    fn lock_timeout_error(&self) -> AnalyticsError {
        AnalyticsError::LockTimeout {
            timeout_ms: self.lock_timeout.as_millis(),
        }
    }

    fn read(&self) -> AnalyticsResult<RwLockReadGuard<'_, ConsensusState>> {
        self.inner
            .try_read_for(self.lock_timeout)
            .ok_or_else(|| self.lock_timeout_error())
    }

    pub fn version(&self) -> AnalyticsResult<ForkVersion> {
        Ok(self.read()?.version())
    }

    pub fn slot(&self) -> AnalyticsResult<Slot> {
        Ok(self.read()?.slot)
    }

    pub fn current_epoch(&self) -> AnalyticsResult<Epoch> {
        Ok(self.read()?.current_epoch(self.slots_per_epoch))
    }

    pub fn validators(&self) -> AnalyticsResult<Vec<Validator>> {
        Ok(self.read()?.validators.clone())
    }

    pub fn balances(&self) -> AnalyticsResult<Vec<Gwei>> {
        Ok(self.read()?.balances.clone())
    }

    /// Independent deep copy of the whole state
    pub fn snapshot(&self) -> AnalyticsResult<ConsensusState> {
        Ok(self.read()?.clone())
    }

    /// Deep copy for async callers.
    ///
    /// Retries the read lock with `try_read` and yields to the runtime
    /// between attempts, so a held write lock parks only this task.
    pub async fn snapshot_async(&self) -> AnalyticsResult<ConsensusState> {
        let deadline = tokio::time::Instant::now() + self.lock_timeout;
        loop {
            let copy = self.inner.try_read().map(|state| ConsensusState::clone(&state));
            if let Some(state) = copy {
                return Ok(state);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(self.lock_timeout_error());
            }
            tokio::time::sleep(LOCK_RETRY_INTERVAL).await;
        }
    }

    /// Previous epoch pending attestations (Phase0 only)
    pub fn previous_epoch_attestations(&self) -> AnalyticsResult<Option<Vec<PendingAttestation>>> {
        let state = self.read()?;
        match &state.fork_data {
            ForkData::Phase0 {
                previous_epoch_attestations,
                ..
            } => Ok(previous_epoch_attestations.clone()),
            other => Err(unsupported("PreviousEpochAttestations", other.version())),
        }
    }

    /// Current epoch pending attestations (Phase0 only)
    pub fn current_epoch_attestations(&self) -> AnalyticsResult<Option<Vec<PendingAttestation>>> {
        let state = self.read()?;
        match &state.fork_data {
            ForkData::Phase0 {
                current_epoch_attestations,
                ..
            } => Ok(current_epoch_attestations.clone()),
            other => Err(unsupported("CurrentEpochAttestations", other.version())),
        }
    }

    /// Pending attestations recorded for `epoch`, which must be the state's
    /// current or previous epoch (Phase0 only).
    pub fn pending_attestations(
        &self,
        epoch: Epoch,
    ) -> AnalyticsResult<Option<Vec<PendingAttestation>>> {
        let state = self.read()?;
        let ForkData::Phase0 {
            previous_epoch_attestations,
            current_epoch_attestations,
        } = &state.fork_data
        else {
            return Err(unsupported("PendingAttestations", state.version()));
        };

        let current = state.current_epoch(self.slots_per_epoch);
        if epoch == current {
            Ok(current_epoch_attestations.clone())
        } else if epoch == state.previous_epoch(self.slots_per_epoch) {
            Ok(previous_epoch_attestations.clone())
        } else {
            Err(AnalyticsError::EpochOutOfRange {
                requested: epoch,
                current,
            })
        }
    }

    /// Previous epoch participation flags (Altair+)
    pub fn previous_epoch_participation(&self) -> AnalyticsResult<Vec<ParticipationFlags>> {
        let state = self.read()?;
        match &state.fork_data {
            ForkData::Participation(fields) => Ok(fields.previous_epoch_participation.clone()),
            other => Err(unsupported("PreviousEpochParticipation", other.version())),
        }
    }

    /// Current epoch participation flags (Altair+)
    pub fn current_epoch_participation(&self) -> AnalyticsResult<Vec<ParticipationFlags>> {
        let state = self.read()?;
        match &state.fork_data {
            ForkData::Participation(fields) => Ok(fields.current_epoch_participation.clone()),
            other => Err(unsupported("CurrentEpochParticipation", other.version())),
        }
    }

    /// Per-validator inactivity scores (Altair+)
    pub fn inactivity_scores(&self) -> AnalyticsResult<Vec<u64>> {
        let state = self.read()?;
        match &state.fork_data {
            ForkData::Participation(fields) => Ok(fields.inactivity_scores.clone()),
            other => Err(unsupported("InactivityScores", other.version())),
        }
    }
}

fn unsupported(field: &'static str, version: ForkVersion) -> AnalyticsError {
    AnalyticsError::UnsupportedForVersion { field, version }
}
