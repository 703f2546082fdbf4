//! Command-line benchmark for the built-in KEM adapters.
//!
//! # Usage
//!
//! ```bash
//! # Default run: ECDH-256, 1,000 warmup and 10,000 measured calls per phase
//! kem-bench
//!
//! # Collect CSV records from several runs
//! for alg in ecdh-256 ecdh-384 ecdh-521; do
//!     kem-bench --algorithm $alg 2>>results.csv
//! done
//!
//! # Short run with interpolated percentiles and a JSON report
//! kem-bench --iterations 1000 --interpolated --json report.json
//! ```
//!
//! Configuration is read from `KEM_BENCH_*` environment variables first, then
//! overridden by flags. Exit status: 0 on success, 1 if the self-check or any
//! phase failed, 2 on invalid configuration.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kem_bench::output::write_json;
use kem_bench::{
    Algorithm, BenchError, BenchmarkRunner, Config, PercentileMode, Phase, Reporter, TimerKind,
};

/// Latency distributions for KEM keygen, encapsulation and decapsulation
#[derive(Parser, Debug)]
#[command(name = "kem-bench")]
#[command(version, about)]
struct Args {
    /// Algorithm: ecdh-256, ecdh-384 or ecdh-521
    #[arg(short, long, default_value = "ecdh-256")]
    algorithm: Algorithm,

    /// Untimed calls before each phase (overrides KEM_BENCH_WARMUP)
    #[arg(short, long)]
    warmup: Option<usize>,

    /// Timed calls per phase (overrides KEM_BENCH_ITERATIONS)
    #[arg(short = 'n', long)]
    iterations: Option<usize>,

    /// Percentage trimmed from each tail, in [0, 50) (overrides KEM_BENCH_TRIM)
    #[arg(short, long)]
    trim: Option<u32>,

    /// Skip warmup for a phase: keygen, encaps or decaps (repeatable)
    #[arg(long = "no-warmup", value_name = "PHASE")]
    no_warmup: Vec<Phase>,

    /// Interpolate percentiles instead of picking the nearest-rank sample
    #[arg(long)]
    interpolated: bool,

    /// Clock source: monotonic or cycles (overrides KEM_BENCH_TIMER)
    #[arg(long)]
    timer: Option<TimerKind>,

    /// Also write the full report as JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Disable colors in the human report
    #[arg(long)]
    no_color: bool,

    /// Skip CPU governor, turbo, SMT, VM and load checks
    #[arg(long)]
    skip_system_checks: bool,

    /// Debug logging to stderr (mixes with the CSV record)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(n) = self.warmup {
            config.warmup_iterations = n;
        }
        if let Some(n) = self.iterations {
            config.measurement_iterations = n;
        }
        if let Some(pct) = self.trim {
            config.trim_percent = pct;
        }
        for &phase in &self.no_warmup {
            config.phase_warmup.set(phase, false);
        }
        if self.interpolated {
            config.percentile_mode = PercentileMode::Interpolated;
        }
        if let Some(timer) = self.timer {
            config.timer = timer;
        }
        config
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "kem_bench=debug" } else { "off" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.config();
    if let Err(err) = config.validate() {
        println!("error: {}", err);
        return ExitCode::from(2);
    }

    let color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
    let mut reporter = Reporter::stdio();
    if !color {
        reporter = reporter.with_color(false);
    }

    let runner = BenchmarkRunner::with_config(args.algorithm.build(), config)
        .system_checks(!args.skip_system_checks);

    let outcome = match runner.run(&mut reporter) {
        Ok(outcome) => outcome,
        Err(BenchError::Config(err)) => {
            println!("error: {}", err);
            return ExitCode::from(2);
        }
        Err(err) => {
            println!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &args.json {
        if let Err(err) = write_json(path, &outcome) {
            println!("error: {}", err);
            return ExitCode::FAILURE;
        }
    }

    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
