//! Sample collection: untimed warmup followed by timed calls.
//!
//! Every measured call is bracketed by two clock reads and contributes exactly
//! one duration. Calls run strictly one after another on the calling thread.

use tracing::trace;

use super::error::SampleError;
use super::timer::{black_box, Clock};
use crate::operation::Operation;
use crate::types::Stage;

/// How many calls to make in each stage of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPlan {
    /// Untimed calls before measurement (0 disables warmup).
    pub warmup_iterations: usize,
    /// Timed calls.
    pub measurement_iterations: usize,
}

impl SamplingPlan {
    /// Create a plan.
    pub fn new(warmup_iterations: usize, measurement_iterations: usize) -> Self {
        Self {
            warmup_iterations,
            measurement_iterations,
        }
    }
}

/// Raw per-call durations for one phase, in nanoseconds, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Vec<u64>,
    clamped: usize,
}

impl SampleBuffer {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if no samples were recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in call order.
    pub fn as_slice(&self) -> &[u64] {
        &self.samples
    }

    /// Number of samples recorded as zero because the clock went backwards.
    pub fn clamped(&self) -> usize {
        self.clamped
    }

    /// Take the underlying vector.
    pub fn into_vec(self) -> Vec<u64> {
        self.samples
    }
}

impl From<Vec<u64>> for SampleBuffer {
    fn from(samples: Vec<u64>) -> Self {
        Self { samples, clamped: 0 }
    }
}

/// Drives an [`Operation`] through warmup and measurement.
#[derive(Debug, Clone)]
pub struct Sampler<C> {
    clock: C,
}

impl<C: Clock> Sampler<C> {
    /// Create a sampler reading `clock`.
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// The clock used for measurements.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run warmup then measurement according to `plan`.
    ///
    /// The returned buffer always holds exactly
    /// `plan.measurement_iterations` samples.
    pub fn run<O>(&self, op: &mut O, plan: SamplingPlan) -> Result<SampleBuffer, SampleError>
    where
        O: Operation + ?Sized,
    {
        self.warm(op, plan.warmup_iterations)?;
        self.measure(op, plan.measurement_iterations)
    }

    /// Call `op` `iterations` times without timing it.
    pub fn warm<O>(&self, op: &mut O, iterations: usize) -> Result<(), SampleError>
    where
        O: Operation + ?Sized,
    {
        for iteration in 0..iterations {
            black_box(op.invoke()).map_err(|source| SampleError::Operation {
                stage: Stage::Warmup,
                iteration,
                source,
            })?;
        }
        Ok(())
    }

    /// Time `iterations` calls of `op`.
    ///
    /// The buffer is reserved up front so no allocation happens between clock
    /// reads. A clock regression is recorded as a zero-length sample and
    /// counted in [`SampleBuffer::clamped`].
    pub fn measure<O>(&self, op: &mut O, iterations: usize) -> Result<SampleBuffer, SampleError>
    where
        O: Operation + ?Sized,
    {
        let mut samples: Vec<u64> = Vec::new();
        samples
            .try_reserve_exact(iterations)
            .map_err(|_| SampleError::Allocation {
                requested: iterations,
            })?;

        let mut clamped = 0;
        for iteration in 0..iterations {
            let start = self.clock.now();
            let result = black_box(op.invoke());
            let end = self.clock.now();

            result.map_err(|source| SampleError::Operation {
                stage: Stage::Measurement,
                iteration,
                source,
            })?;

            let elapsed = match self.clock.checked_elapsed_ns(start, end) {
                Some(ns) => ns,
                None => {
                    trace!(iteration, "clock went backwards; recording zero");
                    clamped += 1;
                    0
                }
            };
            samples.push(elapsed);
        }

        Ok(SampleBuffer { samples, clamped })
    }
}
