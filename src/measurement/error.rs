//! Error types for sample collection.

use thiserror::Error;

use crate::kem::KemError;
use crate::types::Stage;

/// Error returned when a phase's samples could not be collected.
///
/// Partially collected samples are discarded: a phase is either measured
/// completely or reported as failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    /// The sample buffer could not be allocated.
    #[error("failed to allocate a sample buffer for {requested} measurements")]
    Allocation {
        /// Number of measurements requested.
        requested: usize,
    },

    /// The operation under test failed. No retry is attempted.
    #[error("operation failed during {stage} iteration {iteration}: {source}")]
    Operation {
        /// Warmup or measurement.
        stage: Stage,
        /// Zero-based iteration within the stage.
        iteration: usize,
        /// Error reported by the operation.
        #[source]
        source: KemError,
    },
}
