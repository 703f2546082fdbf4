//! Preflight checks around the measurement.
//!
//! # Checks Performed
//!
//! - **Self-check**: one keygen/encapsulate/decapsulate round trip whose
//!   secrets must match before anything is timed (fatal on failure)
//! - **Resolution**: per phase, flags heavily quantized samples
//! - **System**: platform checks such as the CPU governor on Linux

mod resolution;
mod self_check;
mod system;

pub use resolution::{resolution_check, ResolutionWarning};
pub use self_check::{self_check, SelfCheckError};
pub use system::{system_check, system_check_at, SystemWarning};

use serde::{Deserialize, Serialize};

/// Non-fatal findings collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreflightResult {
    /// Warnings from system checks.
    pub system: Vec<SystemWarning>,

    /// Warnings from timer resolution checks.
    pub resolution: Vec<ResolutionWarning>,
}

impl PreflightResult {
    /// Create a new empty preflight result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a system warning.
    pub fn add_system_warning(&mut self, warning: SystemWarning) {
        self.system.push(warning);
    }

    /// Add a resolution warning.
    pub fn add_resolution_warning(&mut self, warning: ResolutionWarning) {
        self.resolution.push(warning);
    }

    /// Whether any resolution warning is critical.
    pub fn has_critical(&self) -> bool {
        self.resolution.iter().any(ResolutionWarning::is_critical)
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.system.is_empty() || !self.resolution.is_empty()
    }

    /// Total number of warnings.
    pub fn count(&self) -> usize {
        self.system.len() + self.resolution.len()
    }

    /// Descriptions of all warnings, system first.
    pub fn descriptions(&self) -> Vec<String> {
        self.system
            .iter()
            .map(SystemWarning::description)
            .chain(self.resolution.iter().map(ResolutionWarning::description))
            .collect()
    }
}
