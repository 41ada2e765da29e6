//! Per-validator vote status for one epoch
//!
//! Normalises the two fork layouts into one table:
//! - Phase0: pending attestations are matched against the block roots of
//!   the state (source = included at all, target = epoch boundary root,
//!   head = root at the attested slot, head requires target).
//! - Altair+: the timely source/target/head participation flags.
//!
//! Slashed or inactive validators never count as voters.

use super::attestation::PendingAttestation;
use super::state::{ConsensusState, ForkData};
use super::{Epoch, Gwei};
use crate::error::{AnalyticsError, AnalyticsResult};

/// Vote status of one validator for one epoch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoteStatus {
    pub active: bool,
    pub slashed: bool,
    pub source: bool,
    pub target: bool,
    pub head: bool,
}

/// Vote status of every registry entry for one epoch
#[derive(Clone, Debug)]
pub struct EpochVotes {
    epoch: Epoch,
    statuses: Vec<VoteStatus>,
}

impl EpochVotes {
    /// Compute statuses for `epoch`, which must be the current or previous
    /// epoch of `state`.
    pub fn compute(
        state: &ConsensusState,
        epoch: Epoch,
        slots_per_epoch: u64,
    ) -> AnalyticsResult<Self> {
        let current = state.current_epoch(slots_per_epoch);
        let is_current = epoch == current;
        if !is_current && epoch != state.previous_epoch(slots_per_epoch) {
            return Err(AnalyticsError::EpochOutOfRange {
                requested: epoch,
                current,
            });
        }

        let mut statuses: Vec<VoteStatus> = state
            .validators
            .iter()
            .map(|v| VoteStatus {
                active: v.is_active_at(epoch),
                slashed: v.slashed,
                ..Default::default()
            })
            .collect();

        match &state.fork_data {
            ForkData::Phase0 {
                previous_epoch_attestations,
                current_epoch_attestations,
            } => {
                let attestations = if is_current {
                    current_epoch_attestations
                } else {
                    previous_epoch_attestations
                };
                let boundary_root = state.block_root(epoch, slots_per_epoch);
                for attestation in attestations.iter().flatten() {
                    apply_pending(state, attestation, boundary_root, &mut statuses);
                }
            }
            ForkData::Participation(fields) => {
                let flags = if is_current {
                    &fields.current_epoch_participation
                } else {
                    &fields.previous_epoch_participation
                };
                for (status, flags) in statuses.iter_mut().zip(flags) {
                    status.source = flags.timely_source();
                    status.target = flags.timely_target();
                    status.head = flags.timely_head();
                }
            }
        }

        for status in &mut statuses {
            if !status.active || status.slashed {
                status.source = false;
                status.target = false;
                status.head = false;
            }
        }

        Ok(Self { epoch, statuses })
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn get(&self, index: usize) -> Option<&VoteStatus> {
        self.statuses.get(index)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Effective balance summed over validators matching `include`
    pub fn sum_effective_balance(
        &self,
        state: &ConsensusState,
        context: &'static str,
        include: impl Fn(&VoteStatus) -> bool,
    ) -> AnalyticsResult<Gwei> {
        self.statuses
            .iter()
            .zip(&state.validators)
            .filter(|(status, _)| include(status))
            .try_fold(0u64, |total, (_, validator)| {
                total
                    .checked_add(validator.effective_balance)
                    .ok_or(AnalyticsError::BalanceOverflow { context })
            })
    }
}

fn apply_pending(
    state: &ConsensusState,
    attestation: &PendingAttestation,
    boundary_root: Option<super::Root>,
    statuses: &mut [VoteStatus],
) {
    let target_matches = boundary_root == Some(attestation.data.target.root);
    let head_matches = target_matches
        && state.block_root_at_slot(attestation.data.slot)
            == Some(attestation.data.beacon_block_root);

    for index in attestation.attesting_indices() {
        let Some(status) = statuses.get_mut(index as usize) else {
            continue;
        };
        status.source = true;
        status.target |= target_matches;
        status.head |= head_matches;
    }
}
