//! Percentiles over sorted samples.
//!
//! Two conventions are supported:
//! - **Nearest rank** (default): `sorted[floor(len * p / 100)]`, always an
//!   observed sample
//! - **Interpolated**: the "R-7" definition, linear interpolation between the
//!   two samples around `(len - 1) * p / 100`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How percentiles are read from a sorted buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PercentileMode {
    /// Select an actual sample by floor index.
    #[default]
    NearestRank,
    /// Linear interpolation between adjacent samples.
    Interpolated,
}

impl fmt::Display for PercentileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentileMode::NearestRank => f.write_str("nearest"),
            PercentileMode::Interpolated => f.write_str("interpolated"),
        }
    }
}

impl FromStr for PercentileMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "nearest-rank" | "rank" => Ok(PercentileMode::NearestRank),
            "interpolated" | "linear" | "r7" => Ok(PercentileMode::Interpolated),
            other => Err(ConfigError::UnknownPercentileMode(other.to_string())),
        }
    }
}

/// Index of the nearest-rank percentile `percent` in a `len`-sample buffer.
///
/// Clamped to the last index so `percent = 100` stays in bounds.
#[inline]
pub fn nearest_rank_index(len: usize, percent: u32) -> usize {
    let idx = (len as u128 * u128::from(percent)) / 100;
    let idx = usize::try_from(idx).unwrap_or(usize::MAX);
    idx.min(len.saturating_sub(1))
}

/// Percentile `percent` (0 to 100) of `sorted`.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn percentile_sorted(sorted: &[u64], percent: u32, mode: PercentileMode) -> f64 {
    assert!(!sorted.is_empty(), "Cannot compute percentile of empty slice");
    debug_assert!(percent <= 100, "Percentile must be in [0, 100]");

    match mode {
        PercentileMode::NearestRank => sorted[nearest_rank_index(sorted.len(), percent)] as f64,
        PercentileMode::Interpolated => interpolated(sorted, f64::from(percent) / 100.0),
    }
}

/// R-7 quantile at probability `p` in [0, 1].
fn interpolated(sorted: &[u64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0] as f64;
    }

    let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
    let h_floor = h.floor() as usize;
    let h_frac = h - h.floor();

    if h_floor >= n - 1 {
        return sorted[n - 1] as f64;
    }

    let lower = sorted[h_floor] as f64;
    if h_frac == 0.0 {
        return lower;
    }

    let upper = sorted[h_floor + 1] as f64;
    lower + h_frac * (upper - lower)
}
