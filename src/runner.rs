//! `BenchmarkRunner`: self-check, then KeyGen, Encapsulation and
//! Decapsulation in sequence.
//!
//! Each phase goes Sampler -> trim -> summarize -> report. A phase whose
//! operation fails is recorded as failed and the next phase still runs; only
//! the CSV record is withheld. Allocation failures and report I/O errors stop
//! the run.

use std::fmt;
use std::io::Write;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::BenchError;
use crate::kem::{Kem, KemState};
use crate::measurement::{trim_outliers, Clock, SampleError, Sampler, Timer, TimerKind};
use crate::operation::KemOperation;
use crate::output::Reporter;
use crate::preflight::{resolution_check, self_check, system_check, PreflightResult};
use crate::result::{Metadata, Outcome, PhaseOutcome, PhaseResult, RunReport};
use crate::statistics::{summarize, PercentileMode};
use crate::types::Phase;

/// Where a run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started.
    Idle,
    /// Running the correctness gate.
    SelfCheck,
    /// Timing a phase.
    Running(Phase),
    /// All phases attempted and reported.
    Done,
    /// Stopped by the self-check.
    Aborted,
}

/// Where a single phase is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    /// Not started.
    Idle,
    /// Untimed warmup calls.
    Warming,
    /// Timed calls.
    Measuring,
    /// Sorting and trimming samples.
    Trimming,
    /// Computing the summary.
    Summarizing,
    /// Block written.
    Reported,
    /// Operation failed; samples discarded.
    Failed,
}

impl PhaseState {
    /// The state a successful phase moves to next, if any.
    pub fn next(self) -> Option<PhaseState> {
        match self {
            PhaseState::Idle => Some(PhaseState::Warming),
            PhaseState::Warming => Some(PhaseState::Measuring),
            PhaseState::Measuring => Some(PhaseState::Trimming),
            PhaseState::Trimming => Some(PhaseState::Summarizing),
            PhaseState::Summarizing => Some(PhaseState::Reported),
            PhaseState::Reported | PhaseState::Failed => None,
        }
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

struct PhaseTracker {
    phase: Phase,
    state: PhaseState,
}

impl PhaseTracker {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            state: PhaseState::Idle,
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.next() {
            debug!(phase = %self.phase, from = %self.state, to = %next, "phase transition");
            self.state = next;
        }
    }

    fn fail(&mut self) {
        debug!(phase = %self.phase, from = %self.state, "phase failed");
        self.state = PhaseState::Failed;
    }
}

/// Runs the three KEM phases against one adapter.
///
/// # Example
///
/// ```ignore
/// use kem_bench::{Algorithm, BenchmarkRunner, Reporter};
///
/// let outcome = BenchmarkRunner::new(Algorithm::Ecdh256.build())
///     .iterations(5_000)
///     .run(&mut Reporter::stdio())?;
/// ```
#[derive(Debug, Clone)]
pub struct BenchmarkRunner<K> {
    kem: K,
    config: Config,
    self_check: bool,
    system_checks: bool,
}

impl<K: Kem> BenchmarkRunner<K> {
    /// Create with default configuration.
    pub fn new(kem: K) -> Self {
        Self::with_config(kem, Config::default())
    }

    /// Create with an explicit configuration.
    pub fn with_config(kem: K, config: Config) -> Self {
        Self {
            kem,
            config,
            self_check: true,
            system_checks: true,
        }
    }

    /// Set warmup iterations per phase.
    pub fn warmup(mut self, n: usize) -> Self {
        self.config.warmup_iterations = n;
        self
    }

    /// Set measured iterations per phase.
    pub fn iterations(mut self, n: usize) -> Self {
        self.config.measurement_iterations = n;
        self
    }

    /// Set the percentage trimmed from each tail.
    pub fn trim_percent(mut self, percent: u32) -> Self {
        self.config.trim_percent = percent;
        self
    }

    /// Enable or disable warmup for one phase.
    pub fn phase_warmup(mut self, phase: Phase, enabled: bool) -> Self {
        self.config.phase_warmup.set(phase, enabled);
        self
    }

    /// Set the percentile convention.
    pub fn percentile_mode(mut self, mode: PercentileMode) -> Self {
        self.config.percentile_mode = mode;
        self
    }

    /// Set the clock source used by [`run`](Self::run).
    pub fn timer(mut self, kind: TimerKind) -> Self {
        self.config.timer = kind;
        self
    }

    /// Enable or disable the startup round-trip check.
    pub fn self_check(mut self, enabled: bool) -> Self {
        self.self_check = enabled;
        self
    }

    /// Enable or disable host configuration checks.
    pub fn system_checks(mut self, enabled: bool) -> Self {
        self.system_checks = enabled;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The adapter under test.
    pub fn kem(&self) -> &K {
        &self.kem
    }

    /// Run with the clock selected by the configuration.
    pub fn run<O, E>(&self, reporter: &mut Reporter<O, E>) -> Result<Outcome, BenchError>
    where
        O: Write,
        E: Write,
    {
        self.config.validate()?;
        let timer = Timer::new(self.config.timer);
        self.run_with_clock(&timer, reporter)
    }

    /// Run with a caller-supplied clock.
    pub fn run_with_clock<C, O, E>(
        &self,
        clock: C,
        reporter: &mut Reporter<O, E>,
    ) -> Result<Outcome, BenchError>
    where
        C: Clock,
        O: Write,
        E: Write,
    {
        self.config.validate()?;
        let started = Instant::now();
        let descriptor = self.kem.descriptor();
        info!(algorithm = %descriptor.name, timer = clock.name(), "starting benchmark");

        let mut state = KemState::for_descriptor(descriptor)?;
        let mut run_state = RunState::Idle;

        if self.self_check {
            transition(&mut run_state, RunState::SelfCheck);
            if let Err(err) = self_check(&self.kem, &mut state) {
                warn!(error = %err, "self-check failed");
                transition(&mut run_state, RunState::Aborted);
                state.wipe();
                let reason = err.to_string();
                reporter.aborted(descriptor, &reason)?;
                return Ok(Outcome::Aborted {
                    algorithm: descriptor.clone(),
                    reason,
                });
            }
        }

        reporter.banner(descriptor, &self.config)?;

        let mut preflight = PreflightResult::new();
        if self.system_checks {
            for warning in system_check() {
                preflight.add_system_warning(warning);
            }
        }

        let sampler = Sampler::new(clock);
        let mut phases = Vec::with_capacity(Phase::ALL.len());
        for phase in Phase::ALL {
            transition(&mut run_state, RunState::Running(phase));
            let result = self.run_phase(&sampler, phase, &mut state, &mut preflight)?;
            reporter.phase(&result)?;
            phases.push(result);
        }

        state.wipe();

        let report = RunReport {
            algorithm: descriptor.clone(),
            config: self.config.clone(),
            phases,
            preflight,
            metadata: Metadata {
                timer: sampler.clock().name().to_string(),
                timer_resolution_ns: sampler.clock().resolution_ns(),
                runtime_secs: started.elapsed().as_secs_f64(),
            },
        };
        reporter.summary(&report)?;
        transition(&mut run_state, RunState::Done);

        info!(
            complete = report.is_complete(),
            runtime_secs = report.metadata.runtime_secs,
            "benchmark finished"
        );
        Ok(Outcome::Completed(report))
    }

    fn run_phase<C: Clock>(
        &self,
        sampler: &Sampler<C>,
        phase: Phase,
        state: &mut KemState,
        preflight: &mut PreflightResult,
    ) -> Result<PhaseResult, BenchError> {
        let mut tracker = PhaseTracker::new(phase);
        let plan = self.config.plan_for(phase);
        let mut op = KemOperation::new(phase, &self.kem, state);

        tracker.advance();
        let sampled = sampler
            .warm(&mut op, plan.warmup_iterations)
            .and_then(|()| {
                tracker.advance();
                sampler.measure(&mut op, plan.measurement_iterations)
            });

        let buffer = match sampled {
            Ok(buffer) => buffer,
            Err(SampleError::Allocation { requested }) => {
                return Err(BenchError::Allocation {
                    what: "sample buffer",
                    bytes: requested.saturating_mul(std::mem::size_of::<u64>()),
                });
            }
            Err(SampleError::Operation {
                stage,
                iteration,
                source,
            }) => {
                tracker.fail();
                warn!(%phase, %stage, iteration, error = %source, "phase failed");
                return Ok(PhaseResult {
                    phase,
                    outcome: PhaseOutcome::Failed {
                        stage,
                        iteration,
                        error: source.to_string(),
                    },
                });
            }
        };

        if let Some(warning) =
            resolution_check(phase, buffer.as_slice(), sampler.clock().resolution_ns())
        {
            preflight.add_resolution_warning(warning);
        }
        let clamped_samples = buffer.clamped();

        tracker.advance();
        let trimmed = trim_outliers(buffer, self.config.trim_percent);

        tracker.advance();
        let summary = summarize(&trimmed, self.config.percentile_mode);
        debug!(%phase, median_ns = summary.median_ns, samples = summary.samples, "phase summarized");

        tracker.advance();
        Ok(PhaseResult {
            phase,
            outcome: PhaseOutcome::Completed {
                summary,
                trim: trimmed.stats(),
                clamped_samples,
            },
        })
    }
}

fn transition(current: &mut RunState, next: RunState) {
    debug!(from = ?current, to = ?next, "run transition");
    *current = next;
}
