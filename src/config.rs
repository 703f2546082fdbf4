//! Configuration for benchmark runs.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::measurement::{SamplingPlan, TimerKind};
use crate::statistics::PercentileMode;
use crate::types::Phase;

/// Environment variable overriding [`Config::warmup_iterations`].
pub const ENV_WARMUP: &str = "KEM_BENCH_WARMUP";
/// Environment variable overriding [`Config::measurement_iterations`].
pub const ENV_ITERATIONS: &str = "KEM_BENCH_ITERATIONS";
/// Environment variable overriding [`Config::trim_percent`].
pub const ENV_TRIM: &str = "KEM_BENCH_TRIM";
/// Environment variable overriding [`Config::percentile_mode`].
pub const ENV_PERCENTILES: &str = "KEM_BENCH_PERCENTILES";
/// Environment variable overriding [`Config::timer`].
pub const ENV_TIMER: &str = "KEM_BENCH_TIMER";

/// Configuration options for a [`BenchmarkRunner`](crate::BenchmarkRunner).
///
/// Read-only once a run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Untimed calls before measuring each phase (default: 1,000).
    pub warmup_iterations: usize,

    /// Timed calls per phase (default: 10,000). Must be at least 1.
    pub measurement_iterations: usize,

    /// Percentage of samples dropped from each tail (default: 10).
    /// Must be in `[0, 50)`.
    pub trim_percent: u32,

    /// Which phases run their warmup.
    pub phase_warmup: PhaseWarmup,

    /// Percentile convention (default: nearest rank).
    pub percentile_mode: PercentileMode,

    /// Clock source (default: monotonic).
    pub timer: TimerKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            warmup_iterations: 1_000,
            measurement_iterations: 10_000,
            trim_percent: 10,
            phase_warmup: PhaseWarmup::default(),
            percentile_mode: PercentileMode::NearestRank,
            timer: TimerKind::Monotonic,
        }
    }
}

impl Config {
    /// Reduced iteration counts for smoke runs.
    ///
    /// Settings:
    /// - 100 warmup iterations (vs 1,000 default)
    /// - 1,000 measured iterations (vs 10,000 default)
    pub fn quick() -> Self {
        Self {
            warmup_iterations: 100,
            measurement_iterations: 1_000,
            ..Self::default()
        }
    }

    /// Larger iteration counts for publication-quality numbers.
    ///
    /// Settings:
    /// - 10,000 warmup iterations
    /// - 100,000 measured iterations
    pub fn thorough() -> Self {
        Self {
            warmup_iterations: 10_000,
            measurement_iterations: 100_000,
            ..Self::default()
        }
    }

    /// Reject degenerate settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.measurement_iterations == 0 {
            return Err(ConfigError::ZeroMeasurements);
        }
        if self.trim_percent >= 50 {
            return Err(ConfigError::TrimOutOfRange {
                percent: self.trim_percent,
            });
        }
        Ok(())
    }

    /// Warmup and measurement counts for `phase`.
    pub fn plan_for(&self, phase: Phase) -> SamplingPlan {
        let warmup = if self.phase_warmup.enabled(phase) {
            self.warmup_iterations
        } else {
            0
        };
        SamplingPlan::new(warmup, self.measurement_iterations)
    }

    /// Defaults merged with the `KEM_BENCH_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Merge configuration from environment variables.
    ///
    /// Values that fail to parse are ignored.
    pub fn merge_env(mut self) -> Self {
        if let Some(n) = parse_env::<usize>(ENV_WARMUP) {
            self.warmup_iterations = n;
        }
        if let Some(n) = parse_env::<usize>(ENV_ITERATIONS) {
            self.measurement_iterations = n;
        }
        if let Some(pct) = parse_env::<u32>(ENV_TRIM) {
            self.trim_percent = pct;
        }
        if let Some(mode) = parse_env::<PercentileMode>(ENV_PERCENTILES) {
            self.percentile_mode = mode;
        }
        if let Some(timer) = parse_env::<TimerKind>(ENV_TIMER) {
            self.timer = timer;
        }
        self
    }
}

/// Per-phase warmup switches. All phases warm up by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseWarmup {
    /// Warm up key generation.
    pub keygen: bool,
    /// Warm up encapsulation.
    pub encapsulation: bool,
    /// Warm up decapsulation.
    pub decapsulation: bool,
}

impl Default for PhaseWarmup {
    fn default() -> Self {
        Self {
            keygen: true,
            encapsulation: true,
            decapsulation: true,
        }
    }
}

impl PhaseWarmup {
    /// Whether `phase` runs its warmup.
    pub fn enabled(&self, phase: Phase) -> bool {
        match phase {
            Phase::KeyGen => self.keygen,
            Phase::Encapsulation => self.encapsulation,
            Phase::Decapsulation => self.decapsulation,
        }
    }

    /// Enable or disable warmup for `phase`.
    pub fn set(&mut self, phase: Phase, enabled: bool) {
        match phase {
            Phase::KeyGen => self.keygen = enabled,
            Phase::Encapsulation => self.encapsulation = enabled,
            Phase::Decapsulation => self.decapsulation = enabled,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.trim().parse().ok()
}
