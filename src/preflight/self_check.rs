//! One-shot correctness gate run before any timing.

use thiserror::Error;

use crate::kem::{Kem, KemError, KemState};
use crate::operation::{KemOperation, Operation};
use crate::types::Phase;

/// Why the self-check refused to start timing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelfCheckError {
    /// Decapsulation recovered a different secret than encapsulation produced.
    #[error("{algorithm}: decapsulated shared secret does not match the encapsulated one")]
    SharedSecretMismatch {
        /// Algorithm under test.
        algorithm: String,
    },

    /// An operation failed during the check.
    #[error("{phase} failed during self-check: {source}")]
    Kem {
        /// Operation that failed.
        phase: Phase,
        /// Adapter error.
        #[source]
        source: KemError,
    },
}

/// Run keygen, encapsulate and decapsulate once and compare the secrets.
///
/// Leaves a valid key pair and ciphertext in `state` on success.
pub fn self_check<K>(kem: &K, state: &mut KemState) -> Result<(), SelfCheckError>
where
    K: Kem + ?Sized,
{
    for phase in Phase::ALL {
        KemOperation::new(phase, kem, state)
            .invoke()
            .map_err(|source| SelfCheckError::Kem { phase, source })?;
    }

    if state.secrets_match() {
        Ok(())
    } else {
        Err(SelfCheckError::SharedSecretMismatch {
            algorithm: kem.descriptor().name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kem::{EcdhP384, KemDescriptor};

    struct Corrupting(KemDescriptor);

    impl Kem for Corrupting {
        fn descriptor(&self) -> &KemDescriptor {
            &self.0
        }
        fn keypair(&self, pk: &mut [u8], sk: &mut [u8]) -> Result<(), KemError> {
            pk.fill(1);
            sk.fill(2);
            Ok(())
        }
        fn encapsulate(&self, ct: &mut [u8], ss: &mut [u8], _pk: &[u8]) -> Result<(), KemError> {
            ct.fill(3);
            ss.fill(4);
            Ok(())
        }
        fn decapsulate(&self, ss: &mut [u8], _ct: &[u8], _sk: &[u8]) -> Result<(), KemError> {
            ss.fill(5);
            Ok(())
        }
    }

    #[test]
    fn test_real_kem_passes() {
        let kem = EcdhP384::new();
        let mut state = KemState::for_descriptor(kem.descriptor()).unwrap();
        self_check(&kem, &mut state).unwrap();
        assert!(!state.is_wiped());
    }

    #[test]
    fn test_mismatch_detected() {
        let kem = Corrupting(KemDescriptor::new("BROKEN", 4, 4, 4, 4));
        let mut state = KemState::for_descriptor(kem.descriptor()).unwrap();
        assert_eq!(
            self_check(&kem, &mut state),
            Err(SelfCheckError::SharedSecretMismatch {
                algorithm: "BROKEN".to_string()
            })
        );
    }

    #[test]
    fn test_kem_failure_names_phase() {
        // Public key buffer is one byte short, so keygen fails first.
        let kem = EcdhP384::new();
        let mut short = kem.descriptor().clone();
        short.public_key_bytes -= 1;
        let mut state = KemState::for_descriptor(&short).unwrap();

        match self_check(&kem, &mut state) {
            Err(SelfCheckError::Kem { phase, .. }) => assert_eq!(phase, Phase::KeyGen),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
