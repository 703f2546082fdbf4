//! System-level preflight checks.
//!
//! Linux-only checks for host settings that add noise to latency numbers.
//! Every finding is informational; none of them stop a run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Load average above which a warning is raised.
const LOAD_THRESHOLD: f64 = 1.0;

/// Warning from system checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SystemWarning {
    /// CPU frequency scaling is not set to performance mode.
    CpuGovernorNotPerformance {
        /// Current governor setting.
        current: String,
    },

    /// Turbo boost is enabled.
    TurboBoostEnabled,

    /// Simultaneous multithreading is active.
    HyperthreadingEnabled,

    /// Running under a hypervisor.
    VirtualMachineDetected,

    /// High system load detected.
    HighSystemLoad {
        /// One-minute load average.
        load_average: f64,
        /// Threshold exceeded.
        threshold: f64,
    },
}

impl SystemWarning {
    /// Get a human-readable description of the warning.
    pub fn description(&self) -> String {
        match self {
            SystemWarning::CpuGovernorNotPerformance { current } => format!(
                "CPU frequency governor is '{}', recommend 'performance' for stable timing. \
                 Set with: sudo cpupower frequency-set -g performance",
                current
            ),
            SystemWarning::TurboBoostEnabled => {
                "Turbo boost is enabled. Clock speed will drift with temperature and load."
                    .to_string()
            }
            SystemWarning::HyperthreadingEnabled => {
                "SMT is active. A sibling thread can steal cycles from the benchmark; \
                 consider pinning with taskset."
                    .to_string()
            }
            SystemWarning::VirtualMachineDetected => {
                "Running under a hypervisor. Expect wider tails from VM exits and scheduling."
                    .to_string()
            }
            SystemWarning::HighSystemLoad {
                load_average,
                threshold,
            } => format!(
                "High system load detected: {:.2} (threshold: {:.2}).",
                load_average, threshold
            ),
        }
    }
}

/// Perform all system checks against the live host.
///
/// Returns an empty vector on non-Linux platforms.
pub fn system_check() -> Vec<SystemWarning> {
    if cfg!(target_os = "linux") {
        system_check_at(Path::new("/"))
    } else {
        Vec::new()
    }
}

/// Perform all system checks reading `sys/` and `proc/` under `root`.
///
/// Missing or unreadable files are skipped.
pub fn system_check_at(root: &Path) -> Vec<SystemWarning> {
    [
        check_cpu_governor(root),
        check_turbo_boost(root),
        check_hyperthreading(root),
        check_hypervisor(root),
        check_load(root),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn read_trimmed(root: &Path, rel: &str) -> Option<String> {
    fs::read_to_string(root.join(rel))
        .ok()
        .map(|s| s.trim().to_string())
}

fn check_cpu_governor(root: &Path) -> Option<SystemWarning> {
    let governor =
        read_trimmed(root, "sys/devices/system/cpu/cpu0/cpufreq/scaling_governor")?.to_lowercase();
    (governor != "performance").then_some(SystemWarning::CpuGovernorNotPerformance {
        current: governor,
    })
}

fn check_turbo_boost(root: &Path) -> Option<SystemWarning> {
    if let Some(no_turbo) = read_trimmed(root, "sys/devices/system/cpu/intel_pstate/no_turbo") {
        return (no_turbo == "0").then_some(SystemWarning::TurboBoostEnabled);
    }
    let boost = read_trimmed(root, "sys/devices/system/cpu/cpufreq/boost")?;
    (boost == "1").then_some(SystemWarning::TurboBoostEnabled)
}

fn check_hyperthreading(root: &Path) -> Option<SystemWarning> {
    let active = read_trimmed(root, "sys/devices/system/cpu/smt/active")?;
    (active == "1").then_some(SystemWarning::HyperthreadingEnabled)
}

fn check_hypervisor(root: &Path) -> Option<SystemWarning> {
    let cpuinfo = fs::read_to_string(root.join("proc/cpuinfo")).ok()?;
    cpuinfo
        .lines()
        .filter(|line| line.starts_with("flags"))
        .any(|line| line.split_whitespace().any(|flag| flag == "hypervisor"))
        .then_some(SystemWarning::VirtualMachineDetected)
}

fn check_load(root: &Path) -> Option<SystemWarning> {
    let loadavg = read_trimmed(root, "proc/loadavg")?;
    let load = loadavg.split_whitespace().next()?.parse::<f64>().ok()?;
    (load > LOAD_THRESHOLD).then_some(SystemWarning::HighSystemLoad {
        load_average: load,
        threshold: LOAD_THRESHOLD,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_system_check_runs() {
        // Just verify it doesn't panic on the live host
        let _warnings = system_check();
    }

    #[test]
    fn test_empty_root_has_no_warnings() {
        let dir = tempfile::tempdir().unwrap();
        assert!(system_check_at(dir.path()).is_empty());
    }

    #[test]
    fn test_noisy_host() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "sys/devices/system/cpu/cpu0/cpufreq/scaling_governor", "powersave\n");
        write(root, "sys/devices/system/cpu/intel_pstate/no_turbo", "0\n");
        write(root, "sys/devices/system/cpu/smt/active", "1\n");
        write(root, "proc/cpuinfo", "processor\t: 0\nflags\t\t: fpu sse2 hypervisor\n");
        write(root, "proc/loadavg", "3.50 2.00 1.00 1/100 1234\n");

        let warnings = system_check_at(root);
        assert_eq!(
            warnings,
            vec![
                SystemWarning::CpuGovernorNotPerformance {
                    current: "powersave".to_string()
                },
                SystemWarning::TurboBoostEnabled,
                SystemWarning::HyperthreadingEnabled,
                SystemWarning::VirtualMachineDetected,
                SystemWarning::HighSystemLoad {
                    load_average: 3.5,
                    threshold: 1.0
                },
            ]
        );
    }

    #[test]
    fn test_quiet_host() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "sys/devices/system/cpu/cpu0/cpufreq/scaling_governor", "performance\n");
        write(root, "sys/devices/system/cpu/cpufreq/boost", "0\n");
        write(root, "sys/devices/system/cpu/smt/active", "0\n");
        write(root, "proc/cpuinfo", "flags\t\t: fpu sse2\n");
        write(root, "proc/loadavg", "0.10 0.20 0.30 1/100 1234\n");

        assert!(system_check_at(root).is_empty());
    }

    #[test]
    fn test_warning_descriptions() {
        let desc = SystemWarning::CpuGovernorNotPerformance {
            current: "powersave".to_string(),
        }
        .description();
        assert!(desc.contains("powersave"));
        assert!(desc.contains("performance"));

        let desc = SystemWarning::HighSystemLoad {
            load_average: 2.5,
            threshold: 1.0,
        }
        .description();
        assert!(desc.contains("2.50"));
    }
}
