//! Common types shared across the benchmark pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A benchmark phase, one per KEM operation being timed.
///
/// Phases always run in the order of [`Phase::ALL`]: each one leaves key
/// material in the shared state that the next one consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Key pair generation.
    KeyGen,
    /// Encapsulation against the current public key.
    Encapsulation,
    /// Decapsulation of the current ciphertext with the current secret key.
    Decapsulation,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 3] = [Phase::KeyGen, Phase::Encapsulation, Phase::Decapsulation];

    /// Human-readable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Phase::KeyGen => "KeyGen",
            Phase::Encapsulation => "Encapsulation",
            Phase::Decapsulation => "Decapsulation",
        }
    }

    /// One-based position of the phase within a run.
    pub fn ordinal(self) -> usize {
        match self {
            Phase::KeyGen => 1,
            Phase::Encapsulation => 2,
            Phase::Decapsulation => 3,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Phase {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keygen" | "key-gen" | "keypair" => Ok(Phase::KeyGen),
            "encaps" | "encapsulate" | "encapsulation" => Ok(Phase::Encapsulation),
            "decaps" | "decapsulate" | "decapsulation" => Ok(Phase::Decapsulation),
            other => Err(ConfigError::UnknownPhase(other.to_string())),
        }
    }
}

/// Part of a phase during which a sample was being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Untimed warmup calls.
    Warmup,
    /// Timed measurement calls.
    Measurement,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Warmup => f.write_str("warmup"),
            Stage::Measurement => f.write_str("measurement"),
        }
    }
}
