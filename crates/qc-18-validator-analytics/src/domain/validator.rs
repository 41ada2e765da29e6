//! Validator registry entries
//!
//! The registry itself belongs to the state-transition pipeline. Entries are
//! read here to derive activity, balances and status transitions.

use super::{Epoch, Gwei};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Position of a validator in the registry
pub type ValidatorIndex = u64;

/// Epoch value meaning "not scheduled"
pub const FAR_FUTURE_EPOCH: Epoch = u64::MAX;

/// Length of a BLS12-381 G1 public key
pub const PUBLIC_KEY_LEN: usize = 48;

/// BLS public key of a validator (48 bytes)
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(#[serde_as(as = "Bytes")] pub [u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    pub fn new(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; PUBLIC_KEY_LEN]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for PublicKey {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Self(bytes))
    }
}

/// Identifier supplied by a caller to look a validator up
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValidatorId {
    Index(ValidatorIndex),
    PublicKey(PublicKey),
    /// Key text that is not a 48-byte hex string. It can never match a
    /// registry entry but is reported back verbatim.
    Unparsed(String),
}

impl ValidatorId {
    /// Parse an externally supplied public key, keeping the original text
    /// when it is not a valid key.
    pub fn from_key_str(key: &str) -> Self {
        match key.parse::<PublicKey>() {
            Ok(pubkey) => ValidatorId::PublicKey(pubkey),
            Err(_) => ValidatorId::Unparsed(key.to_string()),
        }
    }
}

impl fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidatorId::Index(index) => write!(f, "{}", index),
            ValidatorId::PublicKey(pubkey) => write!(f, "{}", pubkey),
            ValidatorId::Unparsed(raw) => f.write_str(raw),
        }
    }
}

/// Registry entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub public_key: PublicKey,
    pub effective_balance: Gwei,
    pub slashed: bool,
    pub activation_eligibility_epoch: Epoch,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
    pub withdrawable_epoch: Epoch,
}

impl Validator {
    /// Validator active since genesis with no exit scheduled
    pub fn new(public_key: PublicKey, effective_balance: Gwei) -> Self {
        Self {
            public_key,
            effective_balance,
            slashed: false,
            activation_eligibility_epoch: 0,
            activation_epoch: 0,
            exit_epoch: FAR_FUTURE_EPOCH,
            withdrawable_epoch: FAR_FUTURE_EPOCH,
        }
    }

    /// Active during `epoch`: `activation_epoch <= epoch < exit_epoch`
    pub fn is_active_at(&self, epoch: Epoch) -> bool {
        self.activation_epoch <= epoch && epoch < self.exit_epoch
    }
}

/// Public key → index lookup over a registry snapshot
#[derive(Debug, Default)]
pub struct RegistryIndex {
    by_pubkey: HashMap<PublicKey, ValidatorIndex>,
}

impl RegistryIndex {
    pub fn build(validators: &[Validator]) -> Self {
        let by_pubkey = validators
            .iter()
            .enumerate()
            .map(|(i, v)| (v.public_key, i as ValidatorIndex))
            .collect();
        Self { by_pubkey }
    }

    pub fn index_of(&self, pubkey: &PublicKey) -> Option<ValidatorIndex> {
        self.by_pubkey.get(pubkey).copied()
    }
}
