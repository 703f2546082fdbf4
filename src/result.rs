//! Result types for benchmark runs.

use serde::Serialize;

use crate::config::Config;
use crate::kem::KemDescriptor;
use crate::measurement::TrimStats;
use crate::preflight::PreflightResult;
use crate::statistics::DistributionSummary;
use crate::types::{Phase, Stage};

/// Result of one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseResult {
    /// Which phase.
    pub phase: Phase,
    /// What happened.
    pub outcome: PhaseOutcome,
}

impl PhaseResult {
    /// Summary, if the phase completed.
    pub fn summary(&self) -> Option<&DistributionSummary> {
        match &self.outcome {
            PhaseOutcome::Completed { summary, .. } => Some(summary),
            PhaseOutcome::Failed { .. } => None,
        }
    }

    /// Whether the phase was aborted.
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, PhaseOutcome::Failed { .. })
    }
}

/// Outcome of timing one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhaseOutcome {
    /// All iterations ran.
    Completed {
        /// Distribution of the trimmed samples.
        summary: DistributionSummary,
        /// How the samples were trimmed.
        trim: TrimStats,
        /// Samples recorded as zero because the clock went backwards.
        clamped_samples: usize,
    },

    /// The operation failed; remaining iterations were skipped and the
    /// partial samples discarded.
    Failed {
        /// Stage in which the failure happened.
        stage: Stage,
        /// Zero-based iteration within the stage.
        iteration: usize,
        /// Error message.
        error: String,
    },
}

/// Per-phase medians in whole nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseMedians {
    /// Key generation median.
    pub keygen: u64,
    /// Encapsulation median.
    pub encapsulation: u64,
    /// Decapsulation median.
    pub decapsulation: u64,
}

impl PhaseMedians {
    /// Encapsulation plus decapsulation: one side each of a key exchange.
    pub fn handshake_total(&self) -> u64 {
        self.encapsulation.saturating_add(self.decapsulation)
    }
}

/// Metadata for debugging and analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    /// Timer type used.
    pub timer: String,
    /// Timer resolution in nanoseconds.
    pub timer_resolution_ns: f64,
    /// Total runtime in seconds.
    pub runtime_secs: f64,
}

/// Everything measured in a run that got past the self-check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Algorithm name and sizes.
    pub algorithm: KemDescriptor,
    /// Configuration the run used.
    pub config: Config,
    /// One entry per phase, in execution order.
    pub phases: Vec<PhaseResult>,
    /// Non-fatal warnings.
    pub preflight: PreflightResult,
    /// Timer and runtime details.
    pub metadata: Metadata,
}

impl RunReport {
    /// Result for `phase`, if it ran.
    pub fn phase(&self, phase: Phase) -> Option<&PhaseResult> {
        self.phases.iter().find(|r| r.phase == phase)
    }

    /// Medians of all three phases, or `None` if any phase failed.
    pub fn medians(&self) -> Option<PhaseMedians> {
        let median = |phase| {
            self.phase(phase)
                .and_then(PhaseResult::summary)
                .map(DistributionSummary::median_whole_ns)
        };
        Some(PhaseMedians {
            keygen: median(Phase::KeyGen)?,
            encapsulation: median(Phase::Encapsulation)?,
            decapsulation: median(Phase::Decapsulation)?,
        })
    }

    /// True if every phase completed.
    pub fn is_complete(&self) -> bool {
        self.medians().is_some()
    }

    /// Phases that were aborted.
    pub fn failed_phases(&self) -> Vec<Phase> {
        self.phases
            .iter()
            .filter(|r| r.is_failed())
            .map(|r| r.phase)
            .collect()
    }
}

/// Top-level outcome of a benchmark run.
///
/// Distinguishes between a run that was measured (possibly with failed
/// phases) and one stopped by the self-check before any timing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    /// All phases were attempted.
    Completed(RunReport),

    /// The self-check failed; nothing was timed.
    Aborted {
        /// Algorithm name and sizes.
        algorithm: KemDescriptor,
        /// Why the run was stopped.
        reason: String,
    },
}

impl Outcome {
    /// The report, if the run got past the self-check.
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Outcome::Completed(report) => Some(report),
            Outcome::Aborted { .. } => None,
        }
    }

    /// True only if every phase completed.
    pub fn is_success(&self) -> bool {
        self.report().is_some_and(RunReport::is_complete)
    }

    /// Algorithm the run targeted.
    pub fn algorithm(&self) -> &KemDescriptor {
        match self {
            Outcome::Completed(report) => &report.algorithm,
            Outcome::Aborted { algorithm, .. } => algorithm,
        }
    }
}
