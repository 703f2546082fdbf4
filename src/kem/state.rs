//! Key material owned by a benchmark run.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::KemDescriptor;
use crate::error::BenchError;

/// Buffers a KEM reads and writes during a run.
///
/// One instance is owned by the runner for the whole run and lent to each
/// phase in turn. All buffers are zeroed by [`wipe`](KemState::wipe) and on
/// drop, and `Debug` never prints their contents.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KemState {
    public_key: Vec<u8>,
    secret_key: Vec<u8>,
    ciphertext: Vec<u8>,
    shared_secret: Vec<u8>,
    recovered_secret: Vec<u8>,
}

fn zeroed(len: usize, what: &'static str) -> Result<Vec<u8>, BenchError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| BenchError::Allocation { what, bytes: len })?;
    buf.resize(len, 0);
    Ok(buf)
}

impl KemState {
    /// Allocate zeroed buffers sized for `descriptor`.
    pub fn for_descriptor(descriptor: &KemDescriptor) -> Result<Self, BenchError> {
        Ok(Self {
            public_key: zeroed(descriptor.public_key_bytes, "public key buffer")?,
            secret_key: zeroed(descriptor.secret_key_bytes, "secret key buffer")?,
            ciphertext: zeroed(descriptor.ciphertext_bytes, "ciphertext buffer")?,
            shared_secret: zeroed(descriptor.shared_secret_bytes, "shared secret buffer")?,
            recovered_secret: zeroed(descriptor.shared_secret_bytes, "shared secret buffer")?,
        })
    }

    /// Current public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Current ciphertext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Secret produced by the last encapsulation.
    pub fn shared_secret(&self) -> &[u8] {
        &self.shared_secret
    }

    /// Secret produced by the last decapsulation.
    pub fn recovered_secret(&self) -> &[u8] {
        &self.recovered_secret
    }

    /// Whether the last encapsulation and decapsulation agree.
    pub fn secrets_match(&self) -> bool {
        self.shared_secret == self.recovered_secret
    }

    /// Output buffers for key generation.
    pub(crate) fn keypair_buffers(&mut self) -> (&mut [u8], &mut [u8]) {
        (&mut self.public_key, &mut self.secret_key)
    }

    /// Output buffers and public key for encapsulation.
    pub(crate) fn encapsulate_buffers(&mut self) -> (&mut [u8], &mut [u8], &[u8]) {
        (&mut self.ciphertext, &mut self.shared_secret, &self.public_key)
    }

    /// Output buffer, ciphertext and secret key for decapsulation.
    pub(crate) fn decapsulate_buffers(&mut self) -> (&mut [u8], &[u8], &[u8]) {
        (&mut self.recovered_secret, &self.ciphertext, &self.secret_key)
    }

    /// Overwrite every buffer with zeros, keeping their sizes.
    pub fn wipe(&mut self) {
        for buf in [
            &mut self.public_key,
            &mut self.secret_key,
            &mut self.ciphertext,
            &mut self.shared_secret,
            &mut self.recovered_secret,
        ] {
            buf.as_mut_slice().zeroize();
        }
    }

    /// True if every buffer is all zeros.
    pub fn is_wiped(&self) -> bool {
        [
            &self.public_key,
            &self.secret_key,
            &self.ciphertext,
            &self.shared_secret,
            &self.recovered_secret,
        ]
        .iter()
        .all(|buf| buf.iter().all(|&b| b == 0))
    }
}

impl fmt::Debug for KemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KemState")
            .field("public_key", &format_args!("[{} bytes]", self.public_key.len()))
            .field("secret_key", &format_args!("[{} bytes, redacted]", self.secret_key.len()))
            .field("ciphertext", &format_args!("[{} bytes]", self.ciphertext.len()))
            .field(
                "shared_secret",
                &format_args!("[{} bytes, redacted]", self.shared_secret.len()),
            )
            .field(
                "recovered_secret",
                &format_args!("[{} bytes, redacted]", self.recovered_secret.len()),
            )
            .finish()
    }
}
