//! Attestation records
//!
//! Phase0 states keep every included attestation as a [`PendingAttestation`].
//! From Altair onward the state keeps one [`ParticipationFlags`] byte per
//! validator instead.

use super::validator::ValidatorIndex;
use super::{Epoch, Root, Slot};
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Epoch boundary checkpoint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checkpoint {
    pub epoch: Epoch,
    pub root: Root,
}

impl Checkpoint {
    pub fn new(epoch: Epoch, root: Root) -> Self {
        Self { epoch, root }
    }
}

/// What a committee voted for
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationData {
    pub slot: Slot,
    /// Committee index within the slot
    pub index: u64,
    /// Head vote
    pub beacon_block_root: Root,
    /// Source vote
    pub source: Checkpoint,
    /// Target vote
    pub target: Checkpoint,
}

/// Attestation included on chain, waiting for epoch processing (Phase0)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAttestation {
    /// One bit per committee member
    pub aggregation_bits: BitVec<u8, Msb0>,
    /// Committee membership at inclusion time, parallel to `aggregation_bits`
    pub committee: Vec<ValidatorIndex>,
    pub data: AttestationData,
    pub inclusion_delay: Slot,
    pub proposer_index: ValidatorIndex,
}

impl PendingAttestation {
    pub fn new(
        aggregation_bits: BitVec<u8, Msb0>,
        committee: Vec<ValidatorIndex>,
        data: AttestationData,
        inclusion_delay: Slot,
        proposer_index: ValidatorIndex,
    ) -> Self {
        Self {
            aggregation_bits,
            committee,
            data,
            inclusion_delay,
            proposer_index,
        }
    }

    /// Committee members whose aggregation bit is set
    pub fn attesting_indices(&self) -> impl Iterator<Item = ValidatorIndex> + '_ {
        self.committee
            .iter()
            .zip(self.aggregation_bits.iter().by_vals())
            .filter_map(|(index, bit)| bit.then_some(*index))
    }

    /// Number of participating committee members
    pub fn participation_count(&self) -> usize {
        self.attesting_indices().count()
    }
}

/// Per-validator timely-vote flags (Altair+)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipationFlags(pub u8);

impl ParticipationFlags {
    pub const TIMELY_SOURCE: u8 = 0;
    pub const TIMELY_TARGET: u8 = 1;
    pub const TIMELY_HEAD: u8 = 2;

    pub fn new(bits: u8) -> Self {
        Self(bits)
    }

    pub fn has_flag(self, flag: u8) -> bool {
        flag < 8 && self.0 & (1 << flag) != 0
    }

    pub fn with_flag(self, flag: u8) -> Self {
        Self(self.0 | 1u8.checked_shl(u32::from(flag)).unwrap_or(0))
    }

    pub fn timely_source(self) -> bool {
        self.has_flag(Self::TIMELY_SOURCE)
    }

    pub fn timely_target(self) -> bool {
        self.has_flag(Self::TIMELY_TARGET)
    }

    pub fn timely_head(self) -> bool {
        self.has_flag(Self::TIMELY_HEAD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attesting_indices_follow_bits() {
        let att = PendingAttestation::new(
            bitvec![u8, Msb0; 1, 0, 1, 1],
            vec![10, 11, 12, 13],
            AttestationData::default(),
            1,
            0,
        );
        let indices: Vec<_> = att.attesting_indices().collect();
        assert_eq!(indices, vec![10, 12, 13]);
        assert_eq!(att.participation_count(), 3);
    }

    #[test]
    fn test_short_bitfield_ignores_extra_members() {
        let att = PendingAttestation::new(
            bitvec![u8, Msb0; 1],
            vec![4, 5, 6],
            AttestationData::default(),
            1,
            0,
        );
        assert_eq!(att.attesting_indices().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_participation_flags() {
        let flags = ParticipationFlags::default()
            .with_flag(ParticipationFlags::TIMELY_SOURCE)
            .with_flag(ParticipationFlags::TIMELY_HEAD);
        assert!(flags.timely_source());
        assert!(!flags.timely_target());
        assert!(flags.timely_head());
        assert!(!flags.has_flag(9));
    }
}
