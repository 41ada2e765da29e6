//! Epoch participation summary
//!
//! `voted_ether / eligible_ether` is the share of active stake that voted
//! for the correct target in the requested epoch. The current/previous
//! breakdowns are independent sums over the same validator semantics, gated
//! on source, target and head correctness. All amounts are Gwei.

use super::state::ConsensusState;
use super::votes::EpochVotes;
use super::{Epoch, Gwei};
use crate::error::AnalyticsResult;
use serde::{Deserialize, Serialize};

/// Aggregate participation figures
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochParticipation {
    /// `voted_ether / eligible_ether`, `0.0` when nothing is eligible
    pub global_participation_rate: f64,
    pub voted_ether: Gwei,
    pub eligible_ether: Gwei,
    pub current_epoch_active_gwei: Gwei,
    pub current_epoch_attesting_gwei: Gwei,
    pub current_epoch_target_attesting_gwei: Gwei,
    pub previous_epoch_active_gwei: Gwei,
    pub previous_epoch_attesting_gwei: Gwei,
    pub previous_epoch_target_attesting_gwei: Gwei,
    pub previous_epoch_head_attesting_gwei: Gwei,
}

/// Participation report for one epoch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipationReport {
    pub epoch: Epoch,
    pub finalized: bool,
    pub participation: EpochParticipation,
}

/// `numerator / denominator`, defined as zero for an empty denominator
pub fn participation_rate(numerator: Gwei, denominator: Gwei) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

/// Build the participation report for `epoch` of `state`.
pub fn compute(
    state: &ConsensusState,
    epoch: Epoch,
    finalized_epoch: Epoch,
    slots_per_epoch: u64,
) -> AnalyticsResult<ParticipationReport> {
    let requested = EpochVotes::compute(state, epoch, slots_per_epoch)?;
    let current =
        EpochVotes::compute(state, state.current_epoch(slots_per_epoch), slots_per_epoch)?;
    let previous =
        EpochVotes::compute(state, state.previous_epoch(slots_per_epoch), slots_per_epoch)?;

    let eligible_ether = requested.sum_effective_balance(state, "eligible ether", |s| s.active)?;
    let voted_ether = requested.sum_effective_balance(state, "voted ether", |s| s.target)?;

    let participation = EpochParticipation {
        global_participation_rate: participation_rate(voted_ether, eligible_ether),
        voted_ether,
        eligible_ether,
        current_epoch_active_gwei: current.sum_effective_balance(
            state,
            "current epoch active",
            |s| s.active,
        )?,
        current_epoch_attesting_gwei: current.sum_effective_balance(
            state,
            "current epoch attesting",
            |s| s.source,
        )?,
        current_epoch_target_attesting_gwei: current.sum_effective_balance(
            state,
            "current epoch target attesting",
            |s| s.target,
        )?,
        previous_epoch_active_gwei: previous.sum_effective_balance(
            state,
            "previous epoch active",
            |s| s.active,
        )?,
        previous_epoch_attesting_gwei: previous.sum_effective_balance(
            state,
            "previous epoch attesting",
            |s| s.source,
        )?,
        previous_epoch_target_attesting_gwei: previous.sum_effective_balance(
            state,
            "previous epoch target attesting",
            |s| s.target,
        )?,
        previous_epoch_head_attesting_gwei: previous.sum_effective_balance(
            state,
            "previous epoch head attesting",
            |s| s.head,
        )?,
    };

    Ok(ParticipationReport {
        epoch,
        finalized: epoch <= finalized_epoch,
        participation,
    })
}
