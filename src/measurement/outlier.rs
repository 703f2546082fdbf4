//! Symmetric percentage trimming.
//!
//! Sorts a phase's samples by duration and drops the same number of samples
//! from each tail:
//! 1. `k = floor(len * percent / 100)`
//! 2. `k == 0` keeps the whole sorted buffer
//! 3. otherwise keeps `sorted[k..len - k]`
//!
//! If `2k >= len` nothing would remain, so the sorted buffer is returned
//! untrimmed instead.

use serde::Serialize;

use super::sampler::SampleBuffer;

/// Statistics about outlier trimming.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrimStats {
    /// Total samples before trimming.
    pub total_samples: usize,
    /// Samples remaining after trimming.
    pub retained_samples: usize,
    /// Samples removed from each tail.
    pub trimmed_per_tail: usize,
    /// Fraction of samples removed (0.0 to 1.0).
    pub outlier_fraction: f64,
}

impl TrimStats {
    /// Stats for a buffer that was sorted but not trimmed.
    pub fn no_trimming(total_samples: usize) -> Self {
        Self {
            total_samples,
            retained_samples: total_samples,
            trimmed_per_tail: 0,
            outlier_fraction: 0.0,
        }
    }

    /// Total samples removed from both tails.
    pub fn outliers_removed(&self) -> usize {
        self.total_samples - self.retained_samples
    }
}

/// A sorted, trimmed sample buffer.
///
/// Only [`trim_outliers`] constructs this type, so holders can rely on the
/// samples being in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedSamples {
    sorted: Vec<u64>,
    stats: TrimStats,
}

impl TrimmedSamples {
    /// Samples in ascending order.
    pub fn as_slice(&self) -> &[u64] {
        &self.sorted
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// True if no samples were retained.
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// How the buffer was trimmed.
    pub fn stats(&self) -> TrimStats {
        self.stats
    }

    /// Take the sorted samples.
    pub fn into_sorted(self) -> Vec<u64> {
        self.sorted
    }
}

/// Number of samples removed from each tail of a `len`-sample buffer.
///
/// Computed without overflow for any `len`.
pub fn trim_count(len: usize, percent: u32) -> usize {
    let k = (len as u128 * u128::from(percent)) / 100;
    usize::try_from(k).unwrap_or(usize::MAX)
}

/// Sort `buffer` and drop `percent` % of samples from each tail.
///
/// Ordering is by duration only. The buffer is consumed and its allocation
/// reused.
pub fn trim_outliers(buffer: SampleBuffer, percent: u32) -> TrimmedSamples {
    let mut sorted = buffer.into_vec();
    sorted.sort_unstable();

    let total = sorted.len();
    let k = trim_count(total, percent);

    if k == 0 || k.saturating_mul(2) >= total {
        return TrimmedSamples {
            sorted,
            stats: TrimStats::no_trimming(total),
        };
    }

    sorted.truncate(total - k);
    sorted.drain(..k);

    let retained = sorted.len();
    TrimmedSamples {
        sorted,
        stats: TrimStats {
            total_samples: total,
            retained_samples: retained,
            trimmed_per_tail: k,
            outlier_fraction: (total - retained) as f64 / total as f64,
        },
    }
}
