//! Monotonic high-resolution clocks.
//!
//! Two clock sources are available:
//! - [`MonotonicClock`]: `std::time::Instant`, unaffected by wall-clock changes
//! - [`CycleClock`]: serialized cycle counter reads, calibrated to nanoseconds
//!   - x86_64: `lfence; rdtsc`
//!   - aarch64: `isb; mrs cntvct_el0`
//!   - other targets: `Instant` fallback
//!
//! Both report elapsed time in nanoseconds and never return a negative or
//! wrapped-around duration.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub use std::hint::black_box;

/// An opaque reading from a [`Clock`], in the clock's own tick unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u64);

/// A monotonic timer that converts pairs of readings into nanoseconds.
pub trait Clock {
    /// Read the clock.
    fn now(&self) -> Timestamp;

    /// Elapsed nanoseconds from `start` to `end`, or `None` if `end` precedes
    /// `start`.
    fn checked_elapsed_ns(&self, start: Timestamp, end: Timestamp) -> Option<u64>;

    /// Elapsed nanoseconds from `start` to `end`, saturating at zero.
    fn elapsed_ns(&self, start: Timestamp, end: Timestamp) -> u64 {
        self.checked_elapsed_ns(start, end).unwrap_or(0)
    }

    /// Short name of the underlying timer, for report metadata.
    fn name(&self) -> &'static str;

    /// Estimated resolution in nanoseconds.
    fn resolution_ns(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn checked_elapsed_ns(&self, start: Timestamp, end: Timestamp) -> Option<u64> {
        (**self).checked_elapsed_ns(start, end)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resolution_ns(&self) -> f64 {
        (**self).resolution_ns()
    }
}

/// Which clock source a run should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// `std::time::Instant` (default).
    #[default]
    Monotonic,
    /// Calibrated CPU cycle counter.
    Cycles,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKind::Monotonic => f.write_str("monotonic"),
            TimerKind::Cycles => f.write_str("cycles"),
        }
    }
}

impl FromStr for TimerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monotonic" | "instant" => Ok(TimerKind::Monotonic),
            "cycles" | "rdtsc" | "cycle" => Ok(TimerKind::Cycles),
            other => Err(ConfigError::UnknownTimer(other.to_string())),
        }
    }
}

/// Clock backed by `std::time::Instant`.
///
/// Readings are nanoseconds since the clock was created.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
    resolution_ns: f64,
}

impl MonotonicClock {
    /// Create a clock and estimate its resolution.
    pub fn new() -> Self {
        let mut clock = Self {
            origin: Instant::now(),
            resolution_ns: 1.0,
        };
        clock.resolution_ns = measure_resolution(&clock, 1.0);
        clock
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Timestamp {
        let nanos = self.origin.elapsed().as_nanos();
        Timestamp(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    #[inline]
    fn checked_elapsed_ns(&self, start: Timestamp, end: Timestamp) -> Option<u64> {
        end.0.checked_sub(start.0)
    }

    fn name(&self) -> &'static str {
        "instant"
    }

    fn resolution_ns(&self) -> f64 {
        self.resolution_ns
    }
}

/// Read the CPU cycle counter with appropriate serialization.
#[inline]
pub fn read_cycles() -> u64 {
    #[cfg(target_arch = "x86_64")]
    {
        read_cycles_x86_64()
    }

    #[cfg(target_arch = "aarch64")]
    {
        read_cycles_aarch64()
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        read_cycles_fallback()
    }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn read_cycles_x86_64() -> u64 {
    std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);

    let cycles: u64;
    // SAFETY: lfence and rdtsc have no memory operands and only clobber rax/rdx.
    unsafe {
        std::arch::asm!(
            "lfence",
            "rdtsc",
            "shl rdx, 32",
            "or rax, rdx",
            out("rax") cycles,
            out("rdx") _,
            options(nostack, nomem),
        );
    }

    std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
    cycles
}

#[cfg(target_arch = "aarch64")]
#[inline]
fn read_cycles_aarch64() -> u64 {
    std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);

    let cycles: u64;
    // SAFETY: isb and a read of the virtual counter register have no side effects.
    unsafe {
        std::arch::asm!(
            "isb",
            "mrs {}, cntvct_el0",
            out(reg) cycles,
            options(nostack, nomem),
        );
    }

    std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
    cycles
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline]
fn read_cycles_fallback() -> u64 {
    use std::sync::OnceLock;
    static START: OnceLock<Instant> = OnceLock::new();

    let start = START.get_or_init(Instant::now);
    start.elapsed().as_nanos() as u64
}

/// Calibrate the cycle counter against `Instant`.
///
/// Returns the median cycles-per-nanosecond ratio over a series of 1 ms
/// sleeps. Falls back to 1.0 if no usable sample was taken.
pub fn cycles_per_ns() -> f64 {
    const CALIBRATION_MS: u64 = 1;
    const CALIBRATION_ROUNDS: usize = 50;

    let mut ratios = Vec::with_capacity(CALIBRATION_ROUNDS);

    for _ in 0..CALIBRATION_ROUNDS {
        let start_cycles = read_cycles();
        let start_time = Instant::now();

        std::thread::sleep(std::time::Duration::from_millis(CALIBRATION_MS));

        let end_cycles = read_cycles();
        let elapsed_nanos = start_time.elapsed().as_nanos() as u64;

        if elapsed_nanos == 0 {
            continue;
        }

        let cycles = end_cycles.saturating_sub(start_cycles);
        ratios.push(cycles as f64 / elapsed_nanos as f64);
    }

    ratios.retain(|r| r.is_finite() && *r > 0.0);
    if ratios.is_empty() {
        return 1.0;
    }

    ratios.sort_by(|a, b| a.total_cmp(b));
    let mid = ratios.len() / 2;
    if ratios.len() % 2 == 0 {
        (ratios[mid - 1] + ratios[mid]) / 2.0
    } else {
        ratios[mid]
    }
}

/// Clock backed by the CPU cycle counter.
#[derive(Debug, Clone)]
pub struct CycleClock {
    cycles_per_ns: f64,
    resolution_ns: f64,
}

impl CycleClock {
    /// Create a clock with automatic calibration.
    pub fn new() -> Self {
        Self::with_cycles_per_ns(cycles_per_ns())
    }

    /// Create a clock with a known cycles-per-nanosecond ratio.
    pub fn with_cycles_per_ns(cycles_per_ns: f64) -> Self {
        let mut clock = Self {
            cycles_per_ns,
            resolution_ns: 1.0,
        };
        clock.resolution_ns = if cycles_per_ns > 0.0 && cycles_per_ns < 0.1 {
            // Coarse counters (e.g. 24 MHz cntvct) tick slower than 1/ns.
            1.0 / cycles_per_ns
        } else {
            measure_resolution(&clock, 1.0)
        };
        clock
    }

    /// Calibrated cycles per nanosecond.
    pub fn cycles_per_ns(&self) -> f64 {
        self.cycles_per_ns
    }
}

impl Default for CycleClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for CycleClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp(read_cycles())
    }

    #[inline]
    fn checked_elapsed_ns(&self, start: Timestamp, end: Timestamp) -> Option<u64> {
        let cycles = end.0.checked_sub(start.0)?;
        Some((cycles as f64 / self.cycles_per_ns).round() as u64)
    }

    fn name(&self) -> &'static str {
        #[cfg(target_arch = "x86_64")]
        {
            "rdtsc"
        }
        #[cfg(target_arch = "aarch64")]
        {
            "cntvct_el0"
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            "instant"
        }
    }

    fn resolution_ns(&self) -> f64 {
        self.resolution_ns
    }
}

/// Empirically measure resolution as the minimum non-zero difference between
/// consecutive reads.
fn measure_resolution<C: Clock>(clock: &C, fallback_ns: f64) -> f64 {
    let mut min_diff = u64::MAX;

    for _ in 0..1000 {
        let t1 = clock.now();
        let t2 = clock.now();
        let diff = clock.elapsed_ns(t1, t2);
        if diff > 0 && diff < min_diff {
            min_diff = diff;
        }
    }

    if min_diff == u64::MAX {
        fallback_ns
    } else {
        min_diff as f64
    }
}

/// A clock chosen at runtime from a [`TimerKind`].
#[derive(Debug, Clone)]
pub enum Timer {
    /// `Instant`-backed clock.
    Monotonic(MonotonicClock),
    /// Cycle-counter clock.
    Cycles(CycleClock),
}

impl Timer {
    /// Build (and calibrate, if needed) the clock for `kind`.
    pub fn new(kind: TimerKind) -> Self {
        match kind {
            TimerKind::Monotonic => Timer::Monotonic(MonotonicClock::new()),
            TimerKind::Cycles => Timer::Cycles(CycleClock::new()),
        }
    }
}

impl Clock for Timer {
    #[inline]
    fn now(&self) -> Timestamp {
        match self {
            Timer::Monotonic(c) => c.now(),
            Timer::Cycles(c) => c.now(),
        }
    }

    #[inline]
    fn checked_elapsed_ns(&self, start: Timestamp, end: Timestamp) -> Option<u64> {
        match self {
            Timer::Monotonic(c) => c.checked_elapsed_ns(start, end),
            Timer::Cycles(c) => c.checked_elapsed_ns(start, end),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Timer::Monotonic(c) => c.name(),
            Timer::Cycles(c) => c.name(),
        }
    }

    fn resolution_ns(&self) -> f64 {
        match self {
            Timer::Monotonic(c) => c.resolution_ns(),
            Timer::Cycles(c) => c.resolution_ns(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_never_regresses() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_elapsed_saturates_at_zero() {
        let clock = MonotonicClock::new();
        assert_eq!(clock.elapsed_ns(Timestamp(500), Timestamp(100)), 0);
        assert_eq!(clock.checked_elapsed_ns(Timestamp(500), Timestamp(100)), None);
        assert_eq!(clock.elapsed_ns(Timestamp(100), Timestamp(350)), 250);
    }

    #[test]
    fn test_cycle_clock_conversion() {
        let clock = CycleClock::with_cycles_per_ns(2.0);
        assert_eq!(clock.elapsed_ns(Timestamp(1_000), Timestamp(3_000)), 1_000);
        assert_eq!(clock.elapsed_ns(Timestamp(3_000), Timestamp(1_000)), 0);
    }

    #[test]
    fn test_cycles_per_ns_reasonable() {
        let cpn = cycles_per_ns();
        // ARM virtual timers run near 0.024 cycles/ns, x86 TSCs at 1-5.
        assert!(cpn > 0.01 && cpn < 10.0, "cycles_per_ns = {}", cpn);
    }

    #[test]
    fn test_measures_work() {
        let clock = MonotonicClock::new();
        let start = clock.now();
        let mut sum = 0u64;
        for i in 0..100_000u64 {
            sum = sum.wrapping_add(black_box(i));
        }
        black_box(sum);
        let end = clock.now();
        assert!(clock.elapsed_ns(start, end) > 0);
    }

    #[test]
    fn test_timer_kind_parse() {
        assert_eq!("monotonic".parse::<TimerKind>().unwrap(), TimerKind::Monotonic);
        assert_eq!("CYCLES".parse::<TimerKind>().unwrap(), TimerKind::Cycles);
        assert!("sundial".parse::<TimerKind>().is_err());
    }

    #[test]
    fn test_timer_dispatch() {
        let timer = Timer::new(TimerKind::Monotonic);
        assert_eq!(timer.name(), "instant");
        assert!(timer.resolution_ns() > 0.0);
    }
}
