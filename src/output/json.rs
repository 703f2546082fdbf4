//! JSON serialization for benchmark outcomes.

use std::fs;
use std::path::Path;

use crate::error::BenchError;
use crate::result::Outcome;

/// Serialize an Outcome to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(outcome: &Outcome) -> Result<String, serde_json::Error> {
    serde_json::to_string(outcome)
}

/// Serialize an Outcome to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_pretty(outcome: &Outcome) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(outcome)
}

/// Write the pretty-printed outcome to `path`, replacing any existing file.
pub fn write_json(path: &Path, outcome: &Outcome) -> Result<(), BenchError> {
    let mut json = to_json_pretty(outcome)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kem::KemDescriptor;
    use crate::result::tests::{completed, failed, report};
    use crate::types::Phase;

    #[test]
    fn test_to_json() {
        let outcome = Outcome::Completed(report(vec![
            completed(Phase::KeyGen, 1000),
            failed(Phase::Encapsulation),
        ]));
        let json = to_json(&outcome).unwrap();
        assert!(json.contains("\"name\":\"ECDH-256\""));
        assert!(json.contains("\"status\":\"completed\""));
        assert!(json.contains("\"status\":\"failed\""));
        assert!(json.contains("\"median_ns\":1000.0"));
    }

    #[test]
    fn test_to_json_pretty() {
        let outcome = Outcome::Aborted {
            algorithm: KemDescriptor::new("ECDH-521", 133, 66, 133, 64),
            reason: "mismatch".to_string(),
        };
        let json = to_json_pretty(&outcome).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("Aborted"));
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let outcome = Outcome::Completed(report(vec![completed(Phase::KeyGen, 42)]));

        write_json(&path, &outcome).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["Completed"]["algorithm"]["public_key_bytes"], 65);
    }
}
