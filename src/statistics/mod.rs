//! Statistical summaries of timing samples.
//!
//! - Percentiles under a nearest-rank or interpolated convention
//! - Mean, population standard deviation, median and percentile bands

mod quantile;
mod summary;

pub use quantile::{nearest_rank_index, percentile_sorted, PercentileMode};
pub use summary::{summarize, summarize_sorted, DistributionSummary, REPORTED_PERCENTILES};
