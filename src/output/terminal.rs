//! Terminal output formatting.
//!
//! Every formatter takes a `color` flag; with `false` the output is plain
//! text, which is what tests and redirected stdout get.

use colored::{ColoredString, Colorize};

use crate::config::Config;
use crate::kem::KemDescriptor;
use crate::result::{PhaseOutcome, PhaseResult, RunReport};
use crate::statistics::DistributionSummary;
use crate::types::Phase;

const RULE: &str = "=====================================";

fn paint(text: &str, color: bool, style: impl Fn(&str) -> ColoredString) -> String {
    if color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

fn heading(phase: Phase) -> &'static str {
    match phase {
        Phase::KeyGen => "Key Generation",
        Phase::Encapsulation => "Encapsulation",
        Phase::Decapsulation => "Decapsulation",
    }
}

/// Header block: algorithm sizes and run configuration.
pub fn format_banner(algorithm: &KemDescriptor, config: &Config, color: bool) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&paint("KEM Latency Benchmark", color, |s| s.bold()));
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Algorithm:   {}\n", algorithm.name));
    out.push_str(&format!("Public Key:  {:>7} bytes\n", algorithm.public_key_bytes));
    out.push_str(&format!("Secret Key:  {:>7} bytes\n", algorithm.secret_key_bytes));
    out.push_str(&format!("Ciphertext:  {:>7} bytes\n", algorithm.ciphertext_bytes));
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Warmup:      {:>7} iterations\n", config.warmup_iterations));
    out.push_str(&format!(
        "Measurement: {:>7} iterations\n",
        config.measurement_iterations
    ));
    out.push_str(&format!(
        "Outliers:    Remove top/bottom {}%\n",
        config.trim_percent
    ));
    out.push_str(RULE);
    out.push('\n');
    out
}

/// Statistics block for one operation.
///
/// ```text
/// KeyGen:
///   Samples:       8000 (after outlier removal)
///   Median:       20512 ns (48751 ops/sec)
///   ...
/// ```
pub fn format_human(label: &str, summary: &DistributionSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}:\n", label));
    out.push_str(&format!(
        "  Samples:    {:>7} (after outlier removal)\n",
        summary.samples
    ));
    match summary.ops_per_second() {
        Some(ops) => out.push_str(&format!(
            "  Median:     {:>7.0} ns ({:.0} ops/sec)\n",
            summary.median_ns, ops
        )),
        None => out.push_str(&format!("  Median:     {:>7.0} ns\n", summary.median_ns)),
    }
    out.push_str(&format!("  Mean:       {:>7.0} ns\n", summary.mean_ns));
    out.push_str(&format!("  Std Dev:    {:>7.0} ns\n", summary.stdev_ns));
    for (pct, value) in summary.percentiles() {
        out.push_str(&format!("  {}th %ile:  {:>7.0} ns\n", pct, value));
    }
    out
}

/// Block for one phase, completed or failed.
pub fn format_phase(result: &PhaseResult, color: bool) -> String {
    let title = format!("Phase {}: {}", result.phase.ordinal(), heading(result.phase));
    let mut out = String::from("\n");

    match &result.outcome {
        PhaseOutcome::Completed {
            summary,
            trim,
            clamped_samples,
        } => {
            out.push_str(&format_human(&title, summary));
            if trim.trimmed_per_tail > 0 {
                out.push_str(&format!(
                    "  Trimmed:    {:>7} per tail ({:.1}% of {})\n",
                    trim.trimmed_per_tail,
                    trim.outlier_fraction * 100.0,
                    trim.total_samples
                ));
            }
            if *clamped_samples > 0 {
                out.push_str(&paint(
                    &format!(
                        "  Clamped:    {:>7} readings where the clock went backwards\n",
                        clamped_samples
                    ),
                    color,
                    |s| s.yellow(),
                ));
            }
        }
        PhaseOutcome::Failed {
            stage,
            iteration,
            error,
        } => {
            out.push_str(&format!("{}:\n", title));
            out.push_str(&paint(
                &format!(
                    "  FAILED during {} iteration {}: {}\n",
                    stage, iteration, error
                ),
                color,
                |s| s.red().bold(),
            ));
        }
    }
    out
}

/// Closing block: medians, handshake total and any warnings.
pub fn format_summary(report: &RunReport, color: bool) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&paint("SUMMARY (Median Times)", color, |s| s.bold()));
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');

    for result in &report.phases {
        let label = format!("{}:", result.phase.label());
        match result.summary() {
            Some(summary) => out.push_str(&format!(
                "{:<18}{:>7} ns\n",
                label,
                summary.median_whole_ns()
            )),
            None => out.push_str(&format!(
                "{:<18}{:>7}\n",
                label,
                paint("FAILED", color, |s| s.red())
            )),
        }
    }

    match report.medians() {
        Some(medians) => out.push_str(&format!(
            "{:<18}{:>7} ns (Encaps + Decaps)\n",
            "Total Handshake:",
            medians.handshake_total()
        )),
        None => {
            let failed: Vec<&str> = report.failed_phases().iter().map(|p| p.label()).collect();
            out.push_str(&paint(
                &format!(
                    "Run incomplete: {} failed, no CSV record emitted\n",
                    failed.join(", ")
                ),
                color,
                |s| s.red().bold(),
            ));
        }
    }
    out.push_str(RULE);
    out.push('\n');

    let warnings = report.preflight.descriptions();
    if !warnings.is_empty() {
        out.push('\n');
        out.push_str(&paint("Warnings:", color, |s| s.yellow().bold()));
        out.push('\n');
        for warning in warnings {
            out.push_str(&format!("  \u{26A0} {}\n", warning));
        }
    }

    out
}

/// Report for a run stopped before timing.
pub fn format_aborted(algorithm: &str, reason: &str, color: bool) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&paint("ERROR: self-check failed, benchmark aborted", color, |s| {
        s.red().bold()
    }));
    out.push('\n');
    out.push_str(&format!("  Algorithm: {}\n", algorithm));
    out.push_str(&format!("  Reason:    {}\n", reason));
    out.push_str("  No operations were timed.\n");
    out
}
