//! Shared fixtures: deterministic clocks and synthetic KEMs.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use kem_bench::measurement::Timestamp;
use kem_bench::{Clock, Kem, KemDescriptor, KemError, Phase};

// ============================================================================
// Clocks
// ============================================================================

/// Clock that replays a fixed list of readings.
///
/// Panics if read more times than scripted.
pub struct ScriptedClock {
    readings: RefCell<VecDeque<u64>>,
}

impl ScriptedClock {
    /// Readings such that consecutive measured calls take `durations` ns.
    pub fn from_durations(durations: &[u64]) -> Self {
        let mut readings = VecDeque::with_capacity(durations.len() * 2);
        let mut t = 1_000u64;
        for &d in durations {
            readings.push_back(t);
            readings.push_back(t + d);
            t += d + 7;
        }
        Self {
            readings: RefCell::new(readings),
        }
    }

    /// Readings left unread.
    pub fn remaining(&self) -> usize {
        self.readings.borrow().len()
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> Timestamp {
        let reading = self
            .readings
            .borrow_mut()
            .pop_front()
            .expect("scripted clock read more times than scripted");
        Timestamp(reading)
    }

    fn checked_elapsed_ns(&self, start: Timestamp, end: Timestamp) -> Option<u64> {
        end.0.checked_sub(start.0)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn resolution_ns(&self) -> f64 {
        1.0
    }
}

/// Clock that advances by a fixed step on every read.
pub struct SteppingClock {
    ticks: Cell<u64>,
    step: u64,
}

impl SteppingClock {
    pub fn new(step: u64) -> Self {
        Self {
            ticks: Cell::new(0),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Timestamp {
        let t = self.ticks.get();
        self.ticks.set(t + self.step);
        Timestamp(t)
    }

    fn checked_elapsed_ns(&self, start: Timestamp, end: Timestamp) -> Option<u64> {
        end.0.checked_sub(start.0)
    }

    fn name(&self) -> &'static str {
        "stepping"
    }

    fn resolution_ns(&self) -> f64 {
        self.step as f64
    }
}

// ============================================================================
// KEMs
// ============================================================================

/// Deterministic toy KEM with ECDH-256 sizes.
///
/// The secret key is a counter pattern, the public key masks it, the
/// ciphertext masks the public key and both sides derive the secret by
/// unmasking.
pub struct XorKem {
    descriptor: KemDescriptor,
}

impl XorKem {
    pub fn new() -> Self {
        Self {
            descriptor: KemDescriptor::new("ECDH-256", 65, 32, 65, 32),
        }
    }
}

const PK_MASK: u8 = 0xA5;
const CT_MASK: u8 = 0x3C;

impl Kem for XorKem {
    fn descriptor(&self) -> &KemDescriptor {
        &self.descriptor
    }

    fn keypair(&self, pk: &mut [u8], sk: &mut [u8]) -> Result<(), KemError> {
        for (i, b) in sk.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(7).wrapping_add(1);
        }
        for (i, b) in pk.iter_mut().enumerate() {
            *b = sk[i % sk.len()] ^ PK_MASK;
        }
        Ok(())
    }

    fn encapsulate(&self, ct: &mut [u8], ss: &mut [u8], pk: &[u8]) -> Result<(), KemError> {
        for (c, p) in ct.iter_mut().zip(pk) {
            *c = p ^ CT_MASK;
        }
        for (s, p) in ss.iter_mut().zip(pk) {
            *s = p ^ PK_MASK;
        }
        Ok(())
    }

    fn decapsulate(&self, ss: &mut [u8], ct: &[u8], _sk: &[u8]) -> Result<(), KemError> {
        for (s, c) in ss.iter_mut().zip(ct) {
            *s = c ^ CT_MASK ^ PK_MASK;
        }
        Ok(())
    }
}

/// XorKem whose decapsulation never recovers the right secret.
pub struct MismatchKem(pub XorKem);

impl Kem for MismatchKem {
    fn descriptor(&self) -> &KemDescriptor {
        self.0.descriptor()
    }

    fn keypair(&self, pk: &mut [u8], sk: &mut [u8]) -> Result<(), KemError> {
        self.0.keypair(pk, sk)
    }

    fn encapsulate(&self, ct: &mut [u8], ss: &mut [u8], pk: &[u8]) -> Result<(), KemError> {
        self.0.encapsulate(ct, ss, pk)
    }

    fn decapsulate(&self, ss: &mut [u8], ct: &[u8], sk: &[u8]) -> Result<(), KemError> {
        self.0.decapsulate(ss, ct, sk)?;
        for b in ss.iter_mut() {
            *b = !*b;
        }
        Ok(())
    }
}

/// XorKem that fails one phase from its `fail_at`-th call on (1-based,
/// counting the self-check call).
pub struct FailingKem {
    inner: XorKem,
    phase: Phase,
    fail_at: usize,
    calls: Cell<usize>,
}

impl FailingKem {
    pub fn new(phase: Phase, fail_at: usize) -> Self {
        Self {
            inner: XorKem::new(),
            phase,
            fail_at,
            calls: Cell::new(0),
        }
    }

    fn check(&self, phase: Phase) -> Result<(), KemError> {
        if phase != self.phase {
            return Ok(());
        }
        let n = self.calls.get() + 1;
        self.calls.set(n);
        if n >= self.fail_at {
            Err(KemError::Failed {
                phase,
                reason: "injected failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl Kem for FailingKem {
    fn descriptor(&self) -> &KemDescriptor {
        self.inner.descriptor()
    }

    fn keypair(&self, pk: &mut [u8], sk: &mut [u8]) -> Result<(), KemError> {
        self.check(Phase::KeyGen)?;
        self.inner.keypair(pk, sk)
    }

    fn encapsulate(&self, ct: &mut [u8], ss: &mut [u8], pk: &[u8]) -> Result<(), KemError> {
        self.check(Phase::Encapsulation)?;
        self.inner.encapsulate(ct, ss, pk)
    }

    fn decapsulate(&self, ss: &mut [u8], ct: &[u8], sk: &[u8]) -> Result<(), KemError> {
        self.check(Phase::Decapsulation)?;
        self.inner.decapsulate(ss, ct, sk)
    }
}
