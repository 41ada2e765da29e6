//! Per-validator performance
//!
//! Evaluated for the state's previous epoch: the last epoch that went
//! through epoch processing, so vote correctness lines up with the balances
//! captured before and after that transition.

use super::state::{ConsensusState, ForkData};
use super::validator::{PublicKey, RegistryIndex, ValidatorId, ValidatorIndex};
use super::votes::EpochVotes;
use super::{Epoch, Gwei};
use crate::error::AnalyticsResult;
use serde::{Deserialize, Serialize};

/// Performance of one resolved validator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorPerformance {
    pub index: ValidatorIndex,
    pub public_key: PublicKey,
    pub correctly_voted_source: bool,
    pub correctly_voted_target: bool,
    pub correctly_voted_head: bool,
    pub current_effective_balance: Gwei,
    pub balance_before_epoch_transition: Gwei,
    pub balance_after_epoch_transition: Gwei,
    /// Only for forks tracking inactivity
    pub inactivity_score: Option<u64>,
}

/// Rows for every resolvable identifier plus the identifiers that were not
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PerformanceReport {
    pub epoch: Epoch,
    pub rows: Vec<ValidatorPerformance>,
    pub missing_validators: Vec<ValidatorId>,
}

/// Resolve `ids` in order and build a row for each one found.
///
/// Unresolvable identifiers are collected, never fatal.
pub fn compute(
    state: &ConsensusState,
    ids: &[ValidatorId],
    slots_per_epoch: u64,
) -> AnalyticsResult<PerformanceReport> {
    let epoch = state.previous_epoch(slots_per_epoch);
    let votes = EpochVotes::compute(state, epoch, slots_per_epoch)?;
    let registry = RegistryIndex::build(&state.validators);
    let inactivity_scores = match &state.fork_data {
        ForkData::Participation(fields) => Some(&fields.inactivity_scores),
        ForkData::Phase0 { .. } => None,
    };

    let mut report = PerformanceReport {
        epoch,
        ..Default::default()
    };

    for id in ids {
        let resolved = match id {
            ValidatorId::Index(index) => Some(*index),
            ValidatorId::PublicKey(pubkey) => registry.index_of(pubkey),
            ValidatorId::Unparsed(_) => None,
        };
        let found = resolved.and_then(|index| {
            let i = usize::try_from(index).ok()?;
            Some((index, i, state.validators.get(i)?))
        });
        let Some((index, i, validator)) = found else {
            report.missing_validators.push(id.clone());
            continue;
        };

        let status = votes.get(i).copied().unwrap_or_default();
        report.rows.push(ValidatorPerformance {
            index,
            public_key: validator.public_key,
            correctly_voted_source: status.source,
            correctly_voted_target: status.target,
            correctly_voted_head: status.head,
            current_effective_balance: validator.effective_balance,
            balance_before_epoch_transition: state.pre_epoch_balances.get(i).copied().unwrap_or(0),
            balance_after_epoch_transition: state.balances.get(i).copied().unwrap_or(0),
            inactivity_score: inactivity_scores.map(|scores| scores.get(i).copied().unwrap_or(0)),
        });
    }

    Ok(report)
}
