//! Top-level error types.

use std::io;

use thiserror::Error;

/// Rejected benchmark configuration.
///
/// Degenerate settings are refused up front rather than clamped into some
/// other behavior at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No measured iterations were requested.
    #[error("measurement iterations must be at least 1")]
    ZeroMeasurements,

    /// Trim percentage would leave no samples.
    #[error("outlier trim percentage must be in [0, 50), got {percent}")]
    TrimOutOfRange {
        /// The rejected percentage.
        percent: u32,
    },

    /// Unknown algorithm name.
    #[error("unknown algorithm '{0}' (expected ecdh-256, ecdh-384 or ecdh-521)")]
    UnknownAlgorithm(String),

    /// Unknown timer name.
    #[error("unknown timer '{0}' (expected monotonic or cycles)")]
    UnknownTimer(String),

    /// Unknown phase name.
    #[error("unknown phase '{0}' (expected keygen, encaps or decaps)")]
    UnknownPhase(String),

    /// Unknown percentile mode.
    #[error("unknown percentile mode '{0}' (expected nearest or interpolated)")]
    UnknownPercentileMode(String),
}

/// Fatal errors that stop a benchmark run.
///
/// Per-phase operation failures are not represented here: they are recorded
/// in the run report and do not stop later phases.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A sample or key-material buffer could not be allocated.
    #[error("failed to allocate {what} ({bytes} bytes)")]
    Allocation {
        /// Which buffer was being allocated.
        what: &'static str,
        /// Requested size in bytes.
        bytes: usize,
    },

    /// Writing a report failed.
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),

    /// Serializing a report failed.
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
