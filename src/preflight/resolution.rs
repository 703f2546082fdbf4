//! Timer resolution check.
//!
//! Detects when the clock is too coarse for the operation being timed. With
//! a ~41ns counter (aarch64 `cntvct_el0` at 24 MHz), sub-tick operations
//! collapse into a handful of values, most of them zero, and the percentile
//! bands stop meaning anything.

use serde::{Deserialize, Serialize};

use crate::types::Phase;

/// Warning from the resolution check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolutionWarning {
    /// Most samples are zero and few distinct values were observed.
    ///
    /// The phase's summary is unreliable.
    InsufficientResolution {
        /// Phase the samples came from.
        phase: Phase,
        /// Number of distinct durations observed.
        unique_values: usize,
        /// Total number of samples.
        total_samples: usize,
        /// Fraction of samples that were exactly zero.
        zero_fraction: f64,
        /// Estimated timer resolution in nanoseconds.
        timer_resolution_ns: f64,
    },

    /// Few distinct durations were observed.
    HighQuantization {
        /// Phase the samples came from.
        phase: Phase,
        /// Number of distinct durations observed.
        unique_values: usize,
        /// Total number of samples.
        total_samples: usize,
    },
}

impl ResolutionWarning {
    /// Check if this warning indicates a critical issue.
    pub fn is_critical(&self) -> bool {
        matches!(self, ResolutionWarning::InsufficientResolution { .. })
    }

    /// Phase the warning refers to.
    pub fn phase(&self) -> Phase {
        match self {
            ResolutionWarning::InsufficientResolution { phase, .. }
            | ResolutionWarning::HighQuantization { phase, .. } => *phase,
        }
    }

    /// Get a human-readable description of the warning.
    pub fn description(&self) -> String {
        match self {
            ResolutionWarning::InsufficientResolution {
                phase,
                unique_values,
                total_samples,
                zero_fraction,
                timer_resolution_ns,
            } => format!(
                "{}: timer resolution (~{:.0}ns) is too coarse for this operation. \
                 Only {} distinct values in {} samples ({:.1}% are zero). \
                 Try the cycle counter (--timer cycles).",
                phase,
                timer_resolution_ns,
                unique_values,
                total_samples,
                zero_fraction * 100.0
            ),
            ResolutionWarning::HighQuantization {
                phase,
                unique_values,
                total_samples,
            } => format!(
                "{}: only {} distinct values in {} samples. \
                 Timer resolution may be affecting the percentiles.",
                phase, unique_values, total_samples
            ),
        }
    }
}

/// Minimum distinct values expected per 1000 samples.
const MIN_UNIQUE_PER_1000: usize = 20;

/// Fraction of zero samples that makes the warning critical.
const CRITICAL_ZERO_FRACTION: f64 = 0.5;

/// Fewer samples than this are not assessed.
const MIN_SAMPLES: usize = 100;

/// Check one phase's raw samples for quantization.
///
/// Returns `None` when the samples look fine or there are too few of them to
/// judge.
pub fn resolution_check(
    phase: Phase,
    samples: &[u64],
    timer_resolution_ns: f64,
) -> Option<ResolutionWarning> {
    if samples.len() < MIN_SAMPLES {
        return None;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let unique_values = sorted.len();

    let zeros = samples.iter().filter(|&&v| v == 0).count();
    let zero_fraction = zeros as f64 / samples.len() as f64;

    let expected_unique = (samples.len() * MIN_UNIQUE_PER_1000 / 1000).max(10);

    if unique_values < expected_unique && zero_fraction > CRITICAL_ZERO_FRACTION {
        return Some(ResolutionWarning::InsufficientResolution {
            phase,
            unique_values,
            total_samples: samples.len(),
            zero_fraction,
            timer_resolution_ns,
        });
    }

    if unique_values < expected_unique / 2 {
        return Some(ResolutionWarning::HighQuantization {
            phase,
            unique_values,
            total_samples: samples.len(),
        });
    }

    None
}
