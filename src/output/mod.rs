//! Human-readable and machine-readable reporting.
//!
//! The human report goes to one writer (stdout) and the CSV record to
//! another (stderr), so `2>results.csv` collects one clean line per run.

mod csv;
mod json;
mod terminal;

pub use self::csv::{format_csv, CSV_HEADER};
pub use self::json::{to_json, to_json_pretty, write_json};
pub use self::terminal::{
    format_aborted, format_banner, format_human, format_phase, format_summary,
};

use std::io::{self, IsTerminal, Stderr, Stdout, Write};

use crate::config::Config;
use crate::kem::KemDescriptor;
use crate::result::{PhaseResult, RunReport};

/// Writes the report as a run progresses.
#[derive(Debug)]
pub struct Reporter<O, E> {
    out: O,
    err: E,
    color: bool,
}

impl Reporter<Stdout, Stderr> {
    /// Report to stdout/stderr, with colors when stdout is a terminal.
    pub fn stdio() -> Self {
        let color = io::stdout().is_terminal();
        Self::new(io::stdout(), io::stderr()).with_color(color)
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    /// Report to `out` (human) and `err` (CSV), without colors.
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            color: false,
        }
    }

    /// Enable or disable ANSI colors in the human report.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Recover the writers.
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    /// Algorithm and configuration header.
    pub fn banner(&mut self, algorithm: &KemDescriptor, config: &Config) -> io::Result<()> {
        self.out
            .write_all(format_banner(algorithm, config, self.color).as_bytes())?;
        self.out.flush()
    }

    /// One phase block.
    pub fn phase(&mut self, result: &PhaseResult) -> io::Result<()> {
        self.out
            .write_all(format_phase(result, self.color).as_bytes())?;
        self.out.flush()
    }

    /// Summary block, then the CSV record if every phase completed.
    pub fn summary(&mut self, report: &RunReport) -> io::Result<()> {
        self.out
            .write_all(format_summary(report, self.color).as_bytes())?;
        self.out.flush()?;

        if let Some(medians) = report.medians() {
            writeln!(self.err, "{}", format_csv(&report.algorithm, &medians))?;
            self.err.flush()?;
        }
        Ok(())
    }

    /// Self-check failure. Nothing goes to the CSV stream.
    pub fn aborted(&mut self, algorithm: &KemDescriptor, reason: &str) -> io::Result<()> {
        self.out
            .write_all(format_aborted(&algorithm.name, reason, self.color).as_bytes())?;
        self.out.flush()
    }
}
