//! Consensus state snapshot
//!
//! Produced and mutated only by the state-transition pipeline. Fields that
//! exist for some forks only live in [`ForkData`], so a state can never carry
//! Phase0 attestation lists and Altair participation at the same time.

use super::attestation::{Checkpoint, ParticipationFlags, PendingAttestation};
use super::fork::ForkVersion;
use super::validator::Validator;
use super::{Epoch, Gwei, Root, Slot};
use crate::error::{AnalyticsError, AnalyticsResult, StateFetchError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the block root history vector
pub const SLOTS_PER_HISTORICAL_ROOT: usize = 8192;

/// Participation bookkeeping introduced at Altair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawParticipationFields")]
pub struct ParticipationFields {
    version: ForkVersion,
    pub previous_epoch_participation: Vec<ParticipationFlags>,
    pub current_epoch_participation: Vec<ParticipationFlags>,
    pub inactivity_scores: Vec<u64>,
}

impl ParticipationFields {
    /// Empty participation for `validator_count` validators.
    ///
    /// Fails for `Phase0`, which records pending attestations instead.
    pub fn new(version: ForkVersion, validator_count: usize) -> AnalyticsResult<Self> {
        if version == ForkVersion::Phase0 {
            return Err(AnalyticsError::ForkDataMismatch {
                version,
                layout: "participation",
            });
        }
        Ok(Self {
            version,
            previous_epoch_participation: vec![ParticipationFlags::default(); validator_count],
            current_epoch_participation: vec![ParticipationFlags::default(); validator_count],
            inactivity_scores: vec![0; validator_count],
        })
    }

    pub fn version(&self) -> ForkVersion {
        self.version
    }
}

/// Unchecked wire form of [`ParticipationFields`]
#[derive(Deserialize)]
struct RawParticipationFields {
    version: ForkVersion,
    previous_epoch_participation: Vec<ParticipationFlags>,
    current_epoch_participation: Vec<ParticipationFlags>,
    inactivity_scores: Vec<u64>,
}

impl TryFrom<RawParticipationFields> for ParticipationFields {
    type Error = AnalyticsError;

    fn try_from(raw: RawParticipationFields) -> AnalyticsResult<Self> {
        let mut fields = Self::new(raw.version, 0)?;
        fields.previous_epoch_participation = raw.previous_epoch_participation;
        fields.current_epoch_participation = raw.current_epoch_participation;
        fields.inactivity_scores = raw.inactivity_scores;
        Ok(fields)
    }
}

/// Fork-specific state fields, keyed by fork
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForkData {
    /// Earliest fork. `None` means the list was never populated.
    Phase0 {
        previous_epoch_attestations: Option<Vec<PendingAttestation>>,
        current_epoch_attestations: Option<Vec<PendingAttestation>>,
    },
    /// Altair and every later fork
    Participation(ParticipationFields),
}

impl ForkData {
    /// Phase0 data with neither attestation list populated yet
    pub fn phase0() -> Self {
        ForkData::Phase0 {
            previous_epoch_attestations: None,
            current_epoch_attestations: None,
        }
    }

    pub fn version(&self) -> ForkVersion {
        match self {
            ForkData::Phase0 { .. } => ForkVersion::Phase0,
            ForkData::Participation(fields) => fields.version(),
        }
    }
}

/// Beacon state as handed over by the pipeline
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusState {
    pub slot: Slot,
    pub validators: Vec<Validator>,
    /// Balances after the most recent epoch transition
    pub balances: Vec<Gwei>,
    /// Balances immediately before the most recent epoch transition
    pub pre_epoch_balances: Vec<Gwei>,
    /// Circular block root history indexed by `slot % len`
    pub block_roots: Vec<Root>,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
    pub fork_data: ForkData,
}

impl ConsensusState {
    /// Genesis state for `validators` under `version`.
    ///
    /// Balances start at the effective balances.
    pub fn genesis(version: ForkVersion, validators: Vec<Validator>) -> AnalyticsResult<Self> {
        let fork_data = match version {
            ForkVersion::Phase0 => ForkData::phase0(),
            _ => ForkData::Participation(ParticipationFields::new(version, validators.len())?),
        };
        let balances: Vec<Gwei> = validators.iter().map(|v| v.effective_balance).collect();
        Ok(Self {
            slot: 0,
            pre_epoch_balances: balances.clone(),
            balances,
            validators,
            block_roots: vec![[0u8; 32]; SLOTS_PER_HISTORICAL_ROOT],
            previous_justified_checkpoint: Checkpoint::default(),
            current_justified_checkpoint: Checkpoint::default(),
            finalized_checkpoint: Checkpoint::default(),
            fork_data,
        })
    }

    pub fn version(&self) -> ForkVersion {
        self.fork_data.version()
    }

    pub fn current_epoch(&self, slots_per_epoch: u64) -> Epoch {
        self.slot.checked_div(slots_per_epoch).unwrap_or(0)
    }

    /// Previous epoch; equals the current epoch at genesis
    pub fn previous_epoch(&self, slots_per_epoch: u64) -> Epoch {
        self.current_epoch(slots_per_epoch).saturating_sub(1)
    }

    /// Root of the block at `slot`, if still inside the history window and
    /// not ahead of the state.
    pub fn block_root_at_slot(&self, slot: Slot) -> Option<Root> {
        let len = self.block_roots.len() as u64;
        if len == 0 || slot > self.slot || self.slot - slot >= len {
            return None;
        }
        self.block_roots.get((slot % len) as usize).copied()
    }

    /// Root of the first block of `epoch`
    pub fn block_root(&self, epoch: Epoch, slots_per_epoch: u64) -> Option<Root> {
        self.block_root_at_slot(epoch.checked_mul(slots_per_epoch)?)
    }

    /// Record `root` as the block at `slot`
    pub fn set_block_root(&mut self, slot: Slot, root: Root) {
        let len = self.block_roots.len();
        if len > 0 {
            self.block_roots[(slot % len as u64) as usize] = root;
        }
    }
}

/// Identifier of a state as accepted from callers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateId {
    Head,
    Genesis,
    Finalized,
    Justified,
    Slot(Slot),
    Root(Root),
}

impl StateId {
    /// Parse `head`, `genesis`, `finalized`, `justified`, a decimal slot or a
    /// `0x`-prefixed 32-byte root.
    pub fn parse(raw: &str) -> Result<Self, StateFetchError> {
        let invalid = || StateFetchError::InvalidStateId {
            state_id: raw.to_string(),
        };
        match raw {
            "" => Err(StateFetchError::MissingStateId),
            "head" => Ok(StateId::Head),
            "genesis" => Ok(StateId::Genesis),
            "finalized" => Ok(StateId::Finalized),
            "justified" => Ok(StateId::Justified),
            _ => {
                if let Some(digits) = raw.strip_prefix("0x") {
                    let mut root = [0u8; 32];
                    hex::decode_to_slice(digits, &mut root).map_err(|_| invalid())?;
                    Ok(StateId::Root(root))
                } else {
                    raw.parse::<Slot>().map(StateId::Slot).map_err(|_| invalid())
                }
            }
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateId::Head => f.write_str("head"),
            StateId::Genesis => f.write_str("genesis"),
            StateId::Finalized => f.write_str("finalized"),
            StateId::Justified => f.write_str("justified"),
            StateId::Slot(slot) => write!(f, "{}", slot),
            StateId::Root(root) => write!(f, "0x{}", hex::encode(root)),
        }
    }
}
