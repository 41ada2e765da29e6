//! Wire types
//!
//! Integers travel as decimal strings, keys as `0x` hex and the
//! participation rate as a six-decimal string.

use crate::domain::{
    ActiveSetChangeReport, EpochParticipation, ParticipationReport, PerformanceReport,
    ValidatorGroup, ValidatorId, ValidatorIndex,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// Body of `POST /prysm/v1/validators/performance`
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRequest {
    #[serde(default)]
    pub public_keys: Vec<String>,
    /// Accepts `"5"` as well as `5`
    #[serde(default)]
    #[serde_as(as = "Vec<PickFirst<(DisplayFromStr, _)>>")]
    pub indices: Vec<ValidatorIndex>,
}

impl PerformanceRequest {
    /// Public keys first, then indices, each in request order
    pub fn validator_ids(&self) -> Vec<ValidatorId> {
        self.public_keys
            .iter()
            .map(|key| ValidatorId::from_key_str(key))
            .chain(self.indices.iter().copied().map(ValidatorId::Index))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationDto {
    pub global_participation_rate: String,
    pub voted_ether: String,
    pub eligible_ether: String,
    pub current_epoch_active_gwei: String,
    pub current_epoch_attesting_gwei: String,
    pub current_epoch_target_attesting_gwei: String,
    pub previous_epoch_active_gwei: String,
    pub previous_epoch_attesting_gwei: String,
    pub previous_epoch_target_attesting_gwei: String,
    pub previous_epoch_head_attesting_gwei: String,
}

impl From<&EpochParticipation> for ParticipationDto {
    fn from(p: &EpochParticipation) -> Self {
        Self {
            global_participation_rate: format!("{:.6}", p.global_participation_rate),
            voted_ether: p.voted_ether.to_string(),
            eligible_ether: p.eligible_ether.to_string(),
            current_epoch_active_gwei: p.current_epoch_active_gwei.to_string(),
            current_epoch_attesting_gwei: p.current_epoch_attesting_gwei.to_string(),
            current_epoch_target_attesting_gwei: p.current_epoch_target_attesting_gwei.to_string(),
            previous_epoch_active_gwei: p.previous_epoch_active_gwei.to_string(),
            previous_epoch_attesting_gwei: p.previous_epoch_attesting_gwei.to_string(),
            previous_epoch_target_attesting_gwei: p
                .previous_epoch_target_attesting_gwei
                .to_string(),
            previous_epoch_head_attesting_gwei: p.previous_epoch_head_attesting_gwei.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationResponse {
    pub epoch: String,
    pub finalized: bool,
    pub participation: ParticipationDto,
}

impl From<&ParticipationReport> for ParticipationResponse {
    fn from(report: &ParticipationReport) -> Self {
        Self {
            epoch: report.epoch.to_string(),
            finalized: report.finalized,
            participation: ParticipationDto::from(&report.participation),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSetChangesResponse {
    pub epoch: String,
    pub activated_public_keys: Vec<String>,
    pub activated_indices: Vec<String>,
    pub exited_public_keys: Vec<String>,
    pub exited_indices: Vec<String>,
    pub slashed_public_keys: Vec<String>,
    pub slashed_indices: Vec<String>,
    pub ejected_public_keys: Vec<String>,
    pub ejected_indices: Vec<String>,
}

fn group_strings(group: &ValidatorGroup) -> (Vec<String>, Vec<String>) {
    group
        .iter()
        .map(|(key, index)| (key.to_hex(), index.to_string()))
        .unzip()
}

impl From<&ActiveSetChangeReport> for ActiveSetChangesResponse {
    fn from(report: &ActiveSetChangeReport) -> Self {
        let (activated_public_keys, activated_indices) = group_strings(&report.activated);
        let (exited_public_keys, exited_indices) = group_strings(&report.exited);
        let (slashed_public_keys, slashed_indices) = group_strings(&report.slashed);
        let (ejected_public_keys, ejected_indices) = group_strings(&report.ejected);
        Self {
            epoch: report.epoch.to_string(),
            activated_public_keys,
            activated_indices,
            exited_public_keys,
            exited_indices,
            slashed_public_keys,
            slashed_indices,
            ejected_public_keys,
            ejected_indices,
        }
    }
}

/// Per-validator columns, aligned by position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceResponse {
    pub public_keys: Vec<String>,
    pub correctly_voted_source: Vec<bool>,
    pub correctly_voted_target: Vec<bool>,
    pub correctly_voted_head: Vec<bool>,
    pub current_effective_balances: Vec<String>,
    pub balances_before_epoch_transition: Vec<String>,
    pub balances_after_epoch_transition: Vec<String>,
    pub missing_validators: Vec<String>,
    /// Empty before Altair
    pub inactivity_scores: Vec<String>,
}

impl From<&PerformanceReport> for PerformanceResponse {
    fn from(report: &PerformanceReport) -> Self {
        let mut response = PerformanceResponse {
            missing_validators: report
                .missing_validators
                .iter()
                .map(ToString::to_string)
                .collect(),
            ..Default::default()
        };
        for row in &report.rows {
            response.public_keys.push(row.public_key.to_hex());
            response.correctly_voted_source.push(row.correctly_voted_source);
            response.correctly_voted_target.push(row.correctly_voted_target);
            response.correctly_voted_head.push(row.correctly_voted_head);
            response
                .current_effective_balances
                .push(row.current_effective_balance.to_string());
            response
                .balances_before_epoch_transition
                .push(row.balance_before_epoch_transition.to_string());
            response
                .balances_after_epoch_transition
                .push(row.balance_after_epoch_transition.to_string());
            if let Some(score) = row.inactivity_score {
                response.inactivity_scores.push(score.to_string());
            }
        }
        response
    }
}
