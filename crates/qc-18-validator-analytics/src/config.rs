//! Analytics configuration
//!
//! Chain constants the computations depend on plus the bound on state read
//! lock acquisition. Defaults are mainnet values.

use crate::domain::{Gwei, GWEI_PER_ETH};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Validator analytics configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Slots per epoch (mainnet: 32)
    pub slots_per_epoch: u64,
    /// Effective balance at or below which an exit counts as an ejection
    pub ejection_balance: Gwei,
    /// Distance between slashing and withdrawability
    pub epochs_per_slashings_vector: u64,
    /// Upper bound on waiting for the state read lock
    pub state_lock_timeout_ms: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            slots_per_epoch: 32,
            ejection_balance: 16 * GWEI_PER_ETH,
            epochs_per_slashings_vector: 8192,
            state_lock_timeout_ms: 2_000,
        }
    }
}

impl AnalyticsConfig {
    /// Minimal preset used by local devnets and tests
    pub fn minimal() -> Self {
        Self {
            slots_per_epoch: 8,
            epochs_per_slashings_vector: 64,
            ..Self::default()
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.state_lock_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slots_per_epoch == 0 {
            return Err(ConfigError::InvalidConstant(
                "slots_per_epoch cannot be 0".into(),
            ));
        }
        if self.epochs_per_slashings_vector == 0 {
            return Err(ConfigError::InvalidConstant(
                "epochs_per_slashings_vector cannot be 0".into(),
            ));
        }
        if self.state_lock_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "state_lock_timeout_ms cannot be 0".into(),
            ));
        }
        Ok(())
    }

    /// Defaults overridden by `QC_ANALYTICS_*` environment variables.
    ///
    /// `QC_ANALYTICS_PRESET=minimal` selects the minimal preset first.
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup("QC_ANALYTICS_PRESET").as_deref() {
            None | Some("mainnet") => Self::default(),
            Some("minimal") => Self::minimal(),
            Some(other) => return Err(ConfigError::UnknownPreset(other.to_string())),
        };

        let overrides: [(&str, &mut u64); 4] = [
            ("QC_ANALYTICS_SLOTS_PER_EPOCH", &mut config.slots_per_epoch),
            ("QC_ANALYTICS_EJECTION_BALANCE", &mut config.ejection_balance),
            (
                "QC_ANALYTICS_EPOCHS_PER_SLASHINGS_VECTOR",
                &mut config.epochs_per_slashings_vector,
            ),
            ("QC_ANALYTICS_LOCK_TIMEOUT_MS", &mut config.state_lock_timeout_ms),
        ];
        for (key, field) in overrides {
            if let Some(raw) = lookup(key) {
                match raw.parse() {
                    Ok(value) => *field = value,
                    Err(_) => warn!("[qc-18] Ignoring {}={:?}: not an unsigned integer", key, raw),
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Chain constant out of range
    #[error("invalid constant: {0}")]
    InvalidConstant(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Preset name not recognised
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}
