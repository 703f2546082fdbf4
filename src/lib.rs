//! # kem-bench
//!
//! Latency distributions for key encapsulation mechanisms.
//!
//! Times key generation, encapsulation and decapsulation one call at a time
//! and reports, per operation:
//! - Median (with operations per second), mean and population standard deviation
//! - 10th, 25th, 75th, 90th and 95th percentiles
//! - The handshake total (encapsulation median + decapsulation median)
//!
//! Samples are trimmed symmetrically before summarizing (10 % from each tail
//! by default) and percentiles use the nearest-rank convention unless
//! interpolation is requested.
//!
//! ## Output contract
//!
//! The human report goes to stdout. A fully successful run also writes exactly
//! one CSV line to stderr:
//!
//! ```text
//! ECDH-256,65,32,65,1000,3000,5000
//! ```
//!
//! (algorithm, public key, secret key and ciphertext bytes, keygen median,
//! decapsulation median, handshake total). Runs with a failed phase or a
//! failed self-check write no CSV line.
//!
//! ## Quick Start
//!
//! ```ignore
//! use kem_bench::{Algorithm, BenchmarkRunner, Config, Reporter};
//!
//! let outcome = BenchmarkRunner::with_config(Algorithm::Ecdh384.build(), Config::quick())
//!     .run(&mut Reporter::stdio())?;
//! assert!(outcome.is_success());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod error;
mod operation;
mod result;
mod runner;
mod types;

// Functional modules
pub mod kem;
pub mod measurement;
pub mod output;
pub mod preflight;
pub mod statistics;

// Re-exports for public API
pub use config::{Config, PhaseWarmup};
pub use error::{BenchError, ConfigError};
pub use kem::{Algorithm, Kem, KemDescriptor, KemError, KemState};
pub use measurement::{Clock, Timer, TimerKind};
pub use operation::{KemOperation, Operation};
pub use output::Reporter;
pub use result::{
    Metadata, Outcome, PhaseMedians, PhaseOutcome, PhaseResult, RunReport,
};
pub use runner::{BenchmarkRunner, PhaseState, RunState};
pub use statistics::{DistributionSummary, PercentileMode};
pub use types::{Phase, Stage};

/// Benchmark a built-in algorithm with `config`, reporting to stdout/stderr.
///
/// Equivalent to
/// `BenchmarkRunner::with_config(algorithm.build(), config).run(&mut Reporter::stdio())`.
pub fn run(algorithm: Algorithm, config: Config) -> Result<Outcome, BenchError> {
    BenchmarkRunner::with_config(algorithm.build(), config).run(&mut Reporter::stdio())
}
