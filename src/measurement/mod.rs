//! Measurement infrastructure.
//!
//! This module provides:
//! - Monotonic clocks, either `Instant`-backed or a calibrated cycle counter
//! - Sample collection with untimed warmup and one duration per timed call
//! - Symmetric percentage trimming of each phase's samples
//!
//! # Timer Selection
//!
//! By default, timing uses `std::time::Instant`. The cycle counter is
//! available as an opt-in:
//! - **x86_64**: `rdtsc` (~1ns resolution)
//! - **aarch64**: `cntvct_el0` virtual timer (resolution varies by SoC,
//!   e.g. ~42ns on Apple Silicon)

mod error;
mod outlier;
mod sampler;
mod timer;

pub use error::SampleError;
pub use outlier::{trim_count, trim_outliers, TrimStats, TrimmedSamples};
pub use sampler::{SampleBuffer, Sampler, SamplingPlan};
pub use timer::{
    black_box, cycles_per_ns, read_cycles, Clock, CycleClock, MonotonicClock, Timer, TimerKind,
    Timestamp,
};
