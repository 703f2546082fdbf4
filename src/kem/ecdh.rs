//! Ephemeral-static ECDH recast as a KEM.
//!
//! - keypair: random scalar `sk`, `pk = sk·G` (SEC1 uncompressed)
//! - encapsulate: ephemeral scalar `e`, `ct = e·G`, `ss = x(e·pk)`
//! - decapsulate: `ss = x(sk·ct)`
//!
//! Curve arithmetic and point validation are delegated to the RustCrypto
//! curve crates.

use std::marker::PhantomData;

use elliptic_curve::ecdh::{diffie_hellman, EphemeralSecret};
use elliptic_curve::sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint};
use elliptic_curve::{AffinePoint, CurveArithmetic, FieldBytesSize, PublicKey, SecretKey};
use rand_core::OsRng;

use super::{Kem, KemDescriptor, KemError};

/// ECDH KEM over the curve `C`.
pub struct EcdhKem<C> {
    descriptor: KemDescriptor,
    _curve: PhantomData<fn() -> C>,
}

/// ECDH over NIST P-256.
pub type EcdhP256 = EcdhKem<p256::NistP256>;

/// ECDH over NIST P-384.
pub type EcdhP384 = EcdhKem<p384::NistP384>;

/// ECDH over NIST P-521.
pub type EcdhP521 = EcdhKem<p521::NistP521>;

impl EcdhKem<p256::NistP256> {
    /// ECDH-256: 65-byte points, 32-byte scalars and secrets.
    pub fn new() -> Self {
        Self::with_descriptor(KemDescriptor::new("ECDH-256", 65, 32, 65, 32))
    }
}

impl Default for EcdhKem<p256::NistP256> {
    fn default() -> Self {
        Self::new()
    }
}

impl EcdhKem<p384::NistP384> {
    /// ECDH-384: 97-byte points, 48-byte scalars and secrets.
    pub fn new() -> Self {
        Self::with_descriptor(KemDescriptor::new("ECDH-384", 97, 48, 97, 48))
    }
}

impl Default for EcdhKem<p384::NistP384> {
    fn default() -> Self {
        Self::new()
    }
}

impl EcdhKem<p521::NistP521> {
    /// ECDH-521: 133-byte points, 66-byte scalars, 64-byte secrets.
    ///
    /// The shared secret is the leading 64 bytes of the 66-byte x-coordinate.
    pub fn new() -> Self {
        Self::with_descriptor(KemDescriptor::new("ECDH-521", 133, 66, 133, 64))
    }
}

impl Default for EcdhKem<p521::NistP521> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> EcdhKem<C> {
    fn with_descriptor(descriptor: KemDescriptor) -> Self {
        Self {
            descriptor,
            _curve: PhantomData,
        }
    }
}

impl<C> std::fmt::Debug for EcdhKem<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdhKem")
            .field("algorithm", &self.descriptor.name)
            .finish()
    }
}

fn check_len(buffer: &'static str, actual: usize, expected: usize) -> Result<(), KemError> {
    if actual == expected {
        Ok(())
    } else {
        Err(KemError::BufferSize {
            buffer,
            expected,
            actual,
        })
    }
}

/// Copy the leading `dst.len()` bytes of `src`.
fn copy_prefix(dst: &mut [u8], src: &[u8], buffer: &'static str) -> Result<(), KemError> {
    let prefix = src.get(..dst.len()).ok_or(KemError::BufferSize {
        buffer,
        expected: src.len(),
        actual: dst.len(),
    })?;
    dst.copy_from_slice(prefix);
    Ok(())
}

impl<C> Kem for EcdhKem<C>
where
    C: CurveArithmetic,
    FieldBytesSize<C>: ModulusSize,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
{
    fn descriptor(&self) -> &KemDescriptor {
        &self.descriptor
    }

    fn keypair(&self, pk: &mut [u8], sk: &mut [u8]) -> Result<(), KemError> {
        let d = &self.descriptor;
        check_len("public key", pk.len(), d.public_key_bytes)?;
        check_len("secret key", sk.len(), d.secret_key_bytes)?;

        let secret = SecretKey::<C>::random(&mut OsRng);
        let point = secret.public_key().to_encoded_point(false);
        copy_prefix(pk, point.as_bytes(), "public key")?;
        copy_prefix(sk, &secret.to_bytes(), "secret key")
    }

    fn encapsulate(&self, ct: &mut [u8], ss: &mut [u8], pk: &[u8]) -> Result<(), KemError> {
        let d = &self.descriptor;
        check_len("ciphertext", ct.len(), d.ciphertext_bytes)?;
        check_len("shared secret", ss.len(), d.shared_secret_bytes)?;

        let peer = PublicKey::<C>::from_sec1_bytes(pk).map_err(|_| KemError::InvalidPublicKey)?;
        let ephemeral = EphemeralSecret::<C>::random(&mut OsRng);
        let shared = ephemeral.diffie_hellman(&peer);
        copy_prefix(ss, shared.raw_secret_bytes(), "shared secret")?;

        let point = ephemeral.public_key().to_encoded_point(false);
        copy_prefix(ct, point.as_bytes(), "ciphertext")
    }

    fn decapsulate(&self, ss: &mut [u8], ct: &[u8], sk: &[u8]) -> Result<(), KemError> {
        check_len("shared secret", ss.len(), self.descriptor.shared_secret_bytes)?;

        let secret = SecretKey::<C>::from_slice(sk).map_err(|_| KemError::InvalidSecretKey)?;
        let peer = PublicKey::<C>::from_sec1_bytes(ct).map_err(|_| KemError::InvalidCiphertext)?;
        let shared = diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
        copy_prefix(ss, shared.raw_secret_bytes(), "shared secret")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<K: Kem>(kem: &K) -> (Vec<u8>, Vec<u8>) {
        let d = kem.descriptor();
        let mut pk = vec![0u8; d.public_key_bytes];
        let mut sk = vec![0u8; d.secret_key_bytes];
        let mut ct = vec![0u8; d.ciphertext_bytes];
        let mut ss = vec![0u8; d.shared_secret_bytes];
        let mut recovered = vec![0u8; d.shared_secret_bytes];

        kem.keypair(&mut pk, &mut sk).unwrap();
        kem.encapsulate(&mut ct, &mut ss, &pk).unwrap();
        kem.decapsulate(&mut recovered, &ct, &sk).unwrap();
        (ss, recovered)
    }

    #[test]
    fn test_p256_round_trip() {
        let (ss, recovered) = round_trip(&EcdhP256::new());
        assert_eq!(ss, recovered);
        assert!(ss.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_p384_round_trip() {
        let (ss, recovered) = round_trip(&EcdhP384::new());
        assert_eq!(ss, recovered);
    }

    #[test]
    fn test_p521_round_trip() {
        let (ss, recovered) = round_trip(&EcdhP521::new());
        assert_eq!(ss.len(), 64);
        assert_eq!(ss, recovered);
    }

    #[test]
    fn test_public_key_is_uncompressed_point() {
        let kem = EcdhP256::new();
        let mut pk = vec![0u8; 65];
        let mut sk = vec![0u8; 32];
        kem.keypair(&mut pk, &mut sk).unwrap();
        assert_eq!(pk[0], 0x04);
    }

    #[test]
    fn test_rejects_wrong_buffer_size() {
        let kem = EcdhP256::new();
        let mut pk = vec![0u8; 64];
        let mut sk = vec![0u8; 32];
        assert_eq!(
            kem.keypair(&mut pk, &mut sk),
            Err(KemError::BufferSize {
                buffer: "public key",
                expected: 65,
                actual: 64
            })
        );
    }

    #[test]
    fn test_rejects_invalid_ciphertext() {
        let kem = EcdhP256::new();
        let mut pk = vec![0u8; 65];
        let mut sk = vec![0u8; 32];
        kem.keypair(&mut pk, &mut sk).unwrap();

        let mut ss = vec![0u8; 32];
        let garbage = vec![0x04u8; 65];
        assert_eq!(
            kem.decapsulate(&mut ss, &garbage, &sk),
            Err(KemError::InvalidCiphertext)
        );
    }
}
