//! Fork versions
//!
//! Later forks replace fields of earlier ones, so the ordering is meaningful:
//! a field introduced at `Altair` exists for every version `>= Altair`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol fork a state was produced under
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForkVersion {
    Phase0,
    Altair,
    Bellatrix,
    Capella,
    Deneb,
    Electra,
}

impl ForkVersion {
    /// Every known fork, oldest first.
    pub const ALL: [ForkVersion; 6] = [
        ForkVersion::Phase0,
        ForkVersion::Altair,
        ForkVersion::Bellatrix,
        ForkVersion::Capella,
        ForkVersion::Deneb,
        ForkVersion::Electra,
    ];

    /// The earliest fork; the only one carrying pending attestation lists.
    pub const EARLIEST: ForkVersion = ForkVersion::Phase0;

    /// Whether states of this fork carry per-validator inactivity scores.
    pub fn tracks_inactivity(self) -> bool {
        self >= ForkVersion::Altair
    }

    pub fn name(self) -> &'static str {
        match self {
            ForkVersion::Phase0 => "phase0",
            ForkVersion::Altair => "altair",
            ForkVersion::Bellatrix => "bellatrix",
            ForkVersion::Capella => "capella",
            ForkVersion::Deneb => "deneb",
            ForkVersion::Electra => "electra",
        }
    }
}

impl fmt::Display for ForkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fork_ordering() {
        assert!(ForkVersion::Phase0 < ForkVersion::Altair);
        assert!(ForkVersion::Deneb < ForkVersion::Electra);
        let mut sorted = ForkVersion::ALL;
        sorted.sort();
        assert_eq!(sorted, ForkVersion::ALL);
    }

    #[test]
    fn test_inactivity_tracking_starts_at_altair() {
        assert!(!ForkVersion::Phase0.tracks_inactivity());
        for fork in &ForkVersion::ALL[1..] {
            assert!(fork.tracks_inactivity());
        }
    }
}
