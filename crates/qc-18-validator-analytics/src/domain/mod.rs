//! Domain module for Validator Analytics
//!
//! ## State access
//! - fork: ordered fork versions
//! - validator: registry entries and identifiers
//! - attestation: Phase0 pending attestations, Altair participation flags
//! - state: the consensus state snapshot and its fork-tagged fields
//! - view: versioned, lock-guarded, copy-on-read accessors
//!
//! ## Epoch summaries
//! - votes: per-validator source/target/head status for one epoch
//! - participation: participation rates and attesting balances
//! - active_set: activations, exits, slashings, ejections
//! - performance: per-validator vote correctness and balances
//! - engine: facade over the three summaries

pub mod active_set;
pub mod attestation;
pub mod engine;
pub mod fork;
pub mod participation;
pub mod performance;
pub mod state;
pub mod validator;
pub mod view;
pub mod votes;

/// Slot number
pub type Slot = u64;
/// Epoch number
pub type Epoch = u64;
/// Amount in Gwei
pub type Gwei = u64;
/// 32-byte block root
pub type Root = [u8; 32];

/// Gwei per ether
pub const GWEI_PER_ETH: Gwei = 1_000_000_000;

pub use active_set::{ActiveSetChangeReport, ValidatorGroup};
pub use attestation::{AttestationData, Checkpoint, ParticipationFlags, PendingAttestation};
pub use engine::EpochAnalyticsEngine;
pub use fork::ForkVersion;
pub use participation::{EpochParticipation, ParticipationReport};
pub use performance::{PerformanceReport, ValidatorPerformance};
pub use state::{ConsensusState, ForkData, StateId};
pub use validator::{PublicKey, Validator, ValidatorId, ValidatorIndex, FAR_FUTURE_EPOCH};
pub use view::{BeaconStateView, SharedState};
pub use votes::{EpochVotes, VoteStatus};
