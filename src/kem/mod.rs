//! Key encapsulation adapters.
//!
//! The harness times three buffer-bound operations behind the [`Kem`] trait.
//! Correctness of the underlying construction belongs to the implementing
//! library; the harness only reads sizes and the algorithm name for reporting.

mod ecdh;
mod state;

pub use ecdh::{EcdhKem, EcdhP256, EcdhP384, EcdhP521};
pub use state::KemState;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ConfigError;
use crate::types::Phase;

/// Algorithm name and buffer sizes, in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KemDescriptor {
    /// Algorithm name as printed in reports (e.g. `ECDH-256`).
    pub name: String,
    /// Public key size.
    pub public_key_bytes: usize,
    /// Secret key size.
    pub secret_key_bytes: usize,
    /// Ciphertext size.
    pub ciphertext_bytes: usize,
    /// Shared secret size.
    pub shared_secret_bytes: usize,
}

impl KemDescriptor {
    /// Create a descriptor.
    pub fn new(
        name: impl Into<String>,
        public_key_bytes: usize,
        secret_key_bytes: usize,
        ciphertext_bytes: usize,
        shared_secret_bytes: usize,
    ) -> Self {
        Self {
            name: name.into(),
            public_key_bytes,
            secret_key_bytes,
            ciphertext_bytes,
            shared_secret_bytes,
        }
    }

    /// Total bytes of key material a [`KemState`] holds for this algorithm.
    pub fn state_bytes(&self) -> usize {
        self.public_key_bytes
            + self.secret_key_bytes
            + self.ciphertext_bytes
            + 2 * self.shared_secret_bytes
    }
}

/// Failure reported by a KEM adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KemError {
    /// The underlying library reported a failure.
    #[error("{phase} failed: {reason}")]
    Failed {
        /// Operation that failed.
        phase: Phase,
        /// Library-provided reason.
        reason: String,
    },

    /// The public key buffer does not hold a valid encoded point.
    #[error("malformed public key")]
    InvalidPublicKey,

    /// The secret key buffer does not hold a valid scalar.
    #[error("malformed secret key")]
    InvalidSecretKey,

    /// The ciphertext buffer does not hold a valid encoded point.
    #[error("malformed ciphertext")]
    InvalidCiphertext,

    /// An output or input buffer has the wrong length.
    #[error("{buffer} buffer holds {actual} bytes, expected {expected}")]
    BufferSize {
        /// Which buffer.
        buffer: &'static str,
        /// Length required by the algorithm.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },
}

/// A key encapsulation mechanism bound to caller-owned buffers.
///
/// Each operation either fills its output buffers completely or returns an
/// error. Buffers must have exactly the sizes given by
/// [`descriptor`](Kem::descriptor).
pub trait Kem {
    /// Algorithm name and sizes.
    fn descriptor(&self) -> &KemDescriptor;

    /// Generate a key pair into `pk` and `sk`.
    fn keypair(&self, pk: &mut [u8], sk: &mut [u8]) -> Result<(), KemError>;

    /// Encapsulate against `pk`, writing the ciphertext and shared secret.
    fn encapsulate(&self, ct: &mut [u8], ss: &mut [u8], pk: &[u8]) -> Result<(), KemError>;

    /// Recover the shared secret from `ct` with `sk`.
    fn decapsulate(&self, ss: &mut [u8], ct: &[u8], sk: &[u8]) -> Result<(), KemError>;
}

impl<K: Kem + ?Sized> Kem for Box<K> {
    fn descriptor(&self) -> &KemDescriptor {
        (**self).descriptor()
    }

    fn keypair(&self, pk: &mut [u8], sk: &mut [u8]) -> Result<(), KemError> {
        (**self).keypair(pk, sk)
    }

    fn encapsulate(&self, ct: &mut [u8], ss: &mut [u8], pk: &[u8]) -> Result<(), KemError> {
        (**self).encapsulate(ct, ss, pk)
    }

    fn decapsulate(&self, ss: &mut [u8], ct: &[u8], sk: &[u8]) -> Result<(), KemError> {
        (**self).decapsulate(ss, ct, sk)
    }
}

impl<K: Kem + ?Sized> Kem for &K {
    fn descriptor(&self) -> &KemDescriptor {
        (**self).descriptor()
    }

    fn keypair(&self, pk: &mut [u8], sk: &mut [u8]) -> Result<(), KemError> {
        (**self).keypair(pk, sk)
    }

    fn encapsulate(&self, ct: &mut [u8], ss: &mut [u8], pk: &[u8]) -> Result<(), KemError> {
        (**self).encapsulate(ct, ss, pk)
    }

    fn decapsulate(&self, ss: &mut [u8], ct: &[u8], sk: &[u8]) -> Result<(), KemError> {
        (**self).decapsulate(ss, ct, sk)
    }
}

/// Built-in algorithm variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// ECDH over NIST P-256.
    #[default]
    Ecdh256,
    /// ECDH over NIST P-384.
    Ecdh384,
    /// ECDH over NIST P-521.
    Ecdh521,
}

impl Algorithm {
    /// All built-in variants.
    pub const ALL: [Algorithm; 3] = [Algorithm::Ecdh256, Algorithm::Ecdh384, Algorithm::Ecdh521];

    /// Construct the adapter for this variant.
    pub fn build(self) -> Box<dyn Kem> {
        match self {
            Algorithm::Ecdh256 => Box::new(EcdhP256::new()),
            Algorithm::Ecdh384 => Box::new(EcdhP384::new()),
            Algorithm::Ecdh521 => Box::new(EcdhP521::new()),
        }
    }

    /// Report name, as used in the CSV record.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Ecdh256 => "ECDH-256",
            Algorithm::Ecdh384 => "ECDH-384",
            Algorithm::Ecdh521 => "ECDH-521",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "ecdh-256" | "ecdh256" | "p256" | "p-256" => Ok(Algorithm::Ecdh256),
            "ecdh-384" | "ecdh384" | "p384" | "p-384" => Ok(Algorithm::Ecdh384),
            "ecdh-521" | "ecdh521" | "p521" | "p-521" => Ok(Algorithm::Ecdh521),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_string())),
        }
    }
}
