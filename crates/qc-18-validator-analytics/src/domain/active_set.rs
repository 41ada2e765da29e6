//! Active set changes for one epoch
//!
//! Status history is derived from the validator fields of a single state.
//! Each validator lands in at most one group, first match wins:
//!
//! 1. slashed   - slashing processed at `epoch` (withdrawable epoch pushed to
//!    `epoch + epochs_per_slashings_vector`)
//! 2. ejected   - exits at `epoch` with effective balance at or below the
//!    ejection balance
//! 3. exited    - exits at `epoch`
//! 4. activated - activates at `epoch`

use super::state::ConsensusState;
use super::validator::{PublicKey, Validator, ValidatorIndex};
use super::Epoch;
use crate::config::AnalyticsConfig;
use serde::{Deserialize, Serialize};

/// Validators sharing one status change, public keys and indices aligned
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorGroup {
    public_keys: Vec<PublicKey>,
    indices: Vec<ValidatorIndex>,
}

impl ValidatorGroup {
    pub fn push(&mut self, public_key: PublicKey, index: ValidatorIndex) {
        self.public_keys.push(public_key);
        self.indices.push(index);
    }

    pub fn public_keys(&self) -> &[PublicKey] {
        &self.public_keys
    }

    pub fn indices(&self) -> &[ValidatorIndex] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: ValidatorIndex) -> bool {
        self.indices.contains(&index)
    }

    /// `(public key, index)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&PublicKey, ValidatorIndex)> {
        self.public_keys.iter().zip(self.indices.iter().copied())
    }
}

/// Activations, exits, slashings and ejections of one epoch
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSetChangeReport {
    pub epoch: Epoch,
    pub activated: ValidatorGroup,
    pub exited: ValidatorGroup,
    pub slashed: ValidatorGroup,
    pub ejected: ValidatorGroup,
}

/// Status change of a single validator at an epoch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusChange {
    Slashed,
    Ejected,
    Exited,
    Activated,
}

/// Classify `validator` for `epoch`, or `None` when nothing changed.
pub fn classify(
    validator: &Validator,
    epoch: Epoch,
    config: &AnalyticsConfig,
) -> Option<StatusChange> {
    let slashed_now = validator.slashed
        && epoch
            .checked_add(config.epochs_per_slashings_vector)
            .is_some_and(|withdrawable| validator.withdrawable_epoch == withdrawable);

    if slashed_now {
        Some(StatusChange::Slashed)
    } else if validator.exit_epoch == epoch
        && validator.effective_balance <= config.ejection_balance
    {
        Some(StatusChange::Ejected)
    } else if validator.exit_epoch == epoch {
        Some(StatusChange::Exited)
    } else if validator.activation_epoch == epoch {
        Some(StatusChange::Activated)
    } else {
        None
    }
}

/// Build the active set change report for `epoch` of `state`.
pub fn compute(
    state: &ConsensusState,
    epoch: Epoch,
    config: &AnalyticsConfig,
) -> ActiveSetChangeReport {
    let mut report = ActiveSetChangeReport {
        epoch,
        ..Default::default()
    };

    for (index, validator) in state.validators.iter().enumerate() {
        let group = match classify(validator, epoch, config) {
            Some(StatusChange::Slashed) => &mut report.slashed,
            Some(StatusChange::Ejected) => &mut report.ejected,
            Some(StatusChange::Exited) => &mut report.exited,
            Some(StatusChange::Activated) => &mut report.activated,
            None => continue,
        };
        group.push(validator.public_key, index as ValidatorIndex);
    }

    report
}
