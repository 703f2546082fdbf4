//! Distribution summary of a phase's trimmed samples.
//!
//! All values are nanoseconds. Variance is the population variance (divided
//! by `len`, not `len - 1`) and the median is `sorted[len / 2]` under the
//! nearest-rank convention, i.e. the upper median for even lengths.

use serde::Serialize;

use super::quantile::{percentile_sorted, PercentileMode};
use crate::measurement::TrimmedSamples;

/// Percentile bands reported for every phase.
pub const REPORTED_PERCENTILES: [u32; 5] = [10, 25, 75, 90, 95];

/// Summary statistics for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionSummary {
    /// Number of samples after trimming.
    pub samples: usize,
    /// Arithmetic mean.
    pub mean_ns: f64,
    /// Population standard deviation.
    pub stdev_ns: f64,
    /// Median.
    pub median_ns: f64,
    /// 10th percentile.
    pub p10_ns: f64,
    /// 25th percentile.
    pub p25_ns: f64,
    /// 75th percentile.
    pub p75_ns: f64,
    /// 90th percentile.
    pub p90_ns: f64,
    /// 95th percentile.
    pub p95_ns: f64,
    /// Convention used for the median and percentiles.
    pub percentile_mode: PercentileMode,
}

impl DistributionSummary {
    /// Operations per second implied by the median, for display.
    ///
    /// `None` when the median is zero.
    pub fn ops_per_second(&self) -> Option<f64> {
        if self.median_ns > 0.0 {
            Some(1e9 / self.median_ns)
        } else {
            None
        }
    }

    /// Median rounded to whole nanoseconds, as written to the CSV record.
    pub fn median_whole_ns(&self) -> u64 {
        self.median_ns.round() as u64
    }

    /// Percentile bands in [`REPORTED_PERCENTILES`] order.
    pub fn percentiles(&self) -> [(u32, f64); 5] {
        [
            (10, self.p10_ns),
            (25, self.p25_ns),
            (75, self.p75_ns),
            (90, self.p90_ns),
            (95, self.p95_ns),
        ]
    }
}

/// Summarize a trimmed phase.
///
/// # Panics
///
/// Panics if `samples` is empty. Validated configurations always yield at
/// least one sample.
pub fn summarize(samples: &TrimmedSamples, mode: PercentileMode) -> DistributionSummary {
    summarize_sorted(samples.as_slice(), mode)
}

/// Summarize a raw slice.
///
/// `sorted` must be in ascending order; the result is meaningless otherwise.
/// Prefer [`summarize`], whose argument type guarantees the ordering.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn summarize_sorted(sorted: &[u64], mode: PercentileMode) -> DistributionSummary {
    assert!(!sorted.is_empty(), "Cannot summarize an empty sample set");
    debug_assert!(
        sorted.windows(2).all(|w| w[0] <= w[1]),
        "Samples must be sorted in ascending order"
    );

    let n = sorted.len() as f64;
    let sum: u128 = sorted.iter().map(|&v| u128::from(v)).sum();
    let mean = sum as f64 / n;

    let variance = sorted
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    let median = match mode {
        PercentileMode::NearestRank => sorted[sorted.len() / 2] as f64,
        PercentileMode::Interpolated => percentile_sorted(sorted, 50, mode),
    };

    let p = |pct| percentile_sorted(sorted, pct, mode);

    DistributionSummary {
        samples: sorted.len(),
        mean_ns: mean,
        stdev_ns: variance.sqrt(),
        median_ns: median,
        p10_ns: p(10),
        p25_ns: p(25),
        p75_ns: p(75),
        p90_ns: p(90),
        p95_ns: p(95),
        percentile_mode: mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{trim_outliers, SampleBuffer};

    #[test]
    fn test_summary_of_five() {
        let s = summarize_sorted(&[1, 2, 3, 4, 5], PercentileMode::NearestRank);
        assert_eq!(s.samples, 5);
        assert_eq!(s.median_ns, 3.0);
        assert_eq!(s.p10_ns, 1.0);
        assert_eq!(s.p25_ns, 2.0);
        assert_eq!(s.p75_ns, 4.0);
        assert_eq!(s.p90_ns, 5.0);
        assert_eq!(s.p95_ns, 5.0);
        assert!((s.mean_ns - 3.0).abs() < 1e-12);
        // population variance of 1..=5 is 2
        assert!((s.stdev_ns - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_summary_after_trim() {
        let buffer = SampleBuffer::from(vec![10, 1, 2, 3, 4, 5, 6, 7, 8, 1000]);
        let trimmed = trim_outliers(buffer, 10);
        let s = summarize(&trimmed, PercentileMode::NearestRank);

        assert_eq!(s.samples, 8);
        assert_eq!(s.median_ns, 6.0);
        assert!((s.mean_ns - 5.625).abs() < 1e-12);
    }

    #[test]
    fn test_even_length_takes_upper_median() {
        let s = summarize_sorted(&[1, 2, 3, 4], PercentileMode::NearestRank);
        assert_eq!(s.median_ns, 3.0);

        let s = summarize_sorted(&[1, 2, 3, 4], PercentileMode::Interpolated);
        assert!((s.median_ns - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample() {
        let s = summarize_sorted(&[42], PercentileMode::NearestRank);
        assert_eq!(s.median_ns, 42.0);
        assert_eq!(s.p95_ns, 42.0);
        assert_eq!(s.stdev_ns, 0.0);
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let s = summarize_sorted(&[u64::MAX, u64::MAX], PercentileMode::NearestRank);
        assert!((s.mean_ns - u64::MAX as f64).abs() / (u64::MAX as f64) < 1e-9);
    }

    #[test]
    fn test_ops_per_second() {
        let s = summarize_sorted(&[1000, 1000, 1000], PercentileMode::NearestRank);
        assert_eq!(s.ops_per_second(), Some(1e6));
        assert_eq!(s.median_whole_ns(), 1000);

        let zero = summarize_sorted(&[0], PercentileMode::NearestRank);
        assert_eq!(zero.ops_per_second(), None);
    }

    #[test]
    #[should_panic(expected = "empty sample set")]
    fn test_empty_panics() {
        summarize_sorted(&[], PercentileMode::NearestRank);
    }
}
