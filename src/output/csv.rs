//! The machine-readable CSV record.
//!
//! One line per fully successful run, written to stderr:
//!
//! ```text
//! algorithm_name,public_key_bytes,secret_key_bytes,ciphertext_bytes,keygen_median_ns,decapsulation_median_ns,handshake_total_ns
//! ```
//!
//! No header is printed, and fields carry no padding or spaces.

use crate::kem::KemDescriptor;
use crate::result::PhaseMedians;

/// Column names, for consumers that want to prepend a header.
pub const CSV_HEADER: &str = "algorithm_name,public_key_bytes,secret_key_bytes,ciphertext_bytes,\
keygen_median_ns,decapsulation_median_ns,handshake_total_ns";

/// Format the CSV record, without a trailing newline.
pub fn format_csv(algorithm: &KemDescriptor, medians: &PhaseMedians) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        algorithm.name,
        algorithm.public_key_bytes,
        algorithm.secret_key_bytes,
        algorithm.ciphertext_bytes,
        medians.keygen,
        medians.decapsulation,
        medians.handshake_total()
    )
}
