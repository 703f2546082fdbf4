//! Timed operations.
//!
//! An [`Operation`] is a zero-argument call that either completes or fails.
//! KEM phases are bound to a [`Kem`] and a [`KemState`] through
//! [`KemOperation`]; closures returning `Result<(), KemError>` are operations
//! too, which is how synthetic workloads are timed.

use crate::kem::{Kem, KemError, KemState};
use crate::types::Phase;

/// A callable unit of work measured by the sampler.
pub trait Operation {
    /// Run the operation once.
    fn invoke(&mut self) -> Result<(), KemError>;
}

impl<F> Operation for F
where
    F: FnMut() -> Result<(), KemError>,
{
    #[inline]
    fn invoke(&mut self) -> Result<(), KemError> {
        self()
    }
}

/// One KEM phase bound to its adapter and the run's key material.
pub struct KemOperation<'a, K: ?Sized> {
    phase: Phase,
    kem: &'a K,
    state: &'a mut KemState,
}

impl<'a, K: Kem + ?Sized> KemOperation<'a, K> {
    /// Bind `phase` to `kem` and `state`.
    pub fn new(phase: Phase, kem: &'a K, state: &'a mut KemState) -> Self {
        Self { phase, kem, state }
    }

    /// The phase this operation runs.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Key generation.
    pub fn keygen(kem: &'a K, state: &'a mut KemState) -> Self {
        Self::new(Phase::KeyGen, kem, state)
    }

    /// Encapsulation against the state's public key.
    pub fn encapsulate(kem: &'a K, state: &'a mut KemState) -> Self {
        Self::new(Phase::Encapsulation, kem, state)
    }

    /// Decapsulation of the state's ciphertext.
    pub fn decapsulate(kem: &'a K, state: &'a mut KemState) -> Self {
        Self::new(Phase::Decapsulation, kem, state)
    }
}

impl<K: Kem + ?Sized> Operation for KemOperation<'_, K> {
    #[inline]
    fn invoke(&mut self) -> Result<(), KemError> {
        match self.phase {
            Phase::KeyGen => {
                let (pk, sk) = self.state.keypair_buffers();
                self.kem.keypair(pk, sk)
            }
            Phase::Encapsulation => {
                let (ct, ss, pk) = self.state.encapsulate_buffers();
                self.kem.encapsulate(ct, ss, pk)
            }
            Phase::Decapsulation => {
                let (ss, ct, sk) = self.state.decapsulate_buffers();
                self.kem.decapsulate(ss, ct, sk)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kem::EcdhP256;

    #[test]
    fn test_closure_is_operation() {
        let mut calls = 0;
        let mut op = || {
            calls += 1;
            Ok::<(), KemError>(())
        };
        op.invoke().unwrap();
        op.invoke().unwrap();
        drop(op);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_kem_operations_share_state() {
        let kem = EcdhP256::new();
        let mut state = KemState::for_descriptor(kem.descriptor()).unwrap();

        KemOperation::keygen(&kem, &mut state).invoke().unwrap();
        KemOperation::encapsulate(&kem, &mut state).invoke().unwrap();
        KemOperation::decapsulate(&kem, &mut state).invoke().unwrap();

        assert!(state.secrets_match());
    }

    #[test]
    fn test_operation_reports_phase() {
        let kem = EcdhP256::new();
        let mut state = KemState::for_descriptor(kem.descriptor()).unwrap();
        let op = KemOperation::new(Phase::Decapsulation, &kem, &mut state);
        assert_eq!(op.phase(), Phase::Decapsulation);
    }
}
