//! Built-in ECDH adapters through the full runner.

use kem_bench::preflight::{self_check, SelfCheckError};
use kem_bench::{
    Algorithm, BenchmarkRunner, Config, Kem, KemOperation, KemState, Operation, Reporter,
};

fn small_config() -> Config {
    Config {
        warmup_iterations: 5,
        measurement_iterations: 40,
        ..Config::default()
    }
}

#[test]
fn every_algorithm_completes() {
    for algorithm in Algorithm::ALL {
        let kem = algorithm.build();
        let d = kem.descriptor().clone();
        let runner = BenchmarkRunner::with_config(kem, small_config()).system_checks(false);
        let mut reporter = Reporter::new(Vec::new(), Vec::new());

        let outcome = runner.run(&mut reporter).unwrap();
        assert!(outcome.is_success(), "{algorithm} run failed");

        let report = outcome.report().unwrap();
        for result in &report.phases {
            // floor(40 * 10 / 100) = 4 per tail
            assert_eq!(result.summary().unwrap().samples, 32);
        }

        let (out, err) = reporter.into_inner();
        let stdout = String::from_utf8(out).unwrap();
        let csv = String::from_utf8(err).unwrap();

        let prefix = format!(
            "{},{},{},{},",
            d.name, d.public_key_bytes, d.secret_key_bytes, d.ciphertext_bytes
        );
        assert!(csv.starts_with(&prefix), "{csv:?} lacks {prefix:?}");
        assert!(csv.ends_with('\n'));
        assert_eq!(csv.lines().count(), 1);
        assert_eq!(csv.trim_end().split(',').count(), 7);

        assert!(stdout.contains(&format!("Algorithm:   {}\n", algorithm.name())));
        assert!(stdout.contains("Total Handshake:"));
    }
}

#[test]
fn csv_fields_match_the_summaries() {
    let runner = BenchmarkRunner::with_config(Algorithm::Ecdh256.build(), small_config())
        .system_checks(false);
    let mut reporter = Reporter::new(Vec::new(), Vec::new());
    let outcome = runner.run(&mut reporter).unwrap();
    let medians = outcome.report().unwrap().medians().unwrap();

    let (_, err) = reporter.into_inner();
    let csv = String::from_utf8(err).unwrap();
    let fields: Vec<&str> = csv.trim_end().split(',').collect();

    assert_eq!(fields[4], medians.keygen.to_string());
    assert_eq!(fields[5], medians.decapsulation.to_string());
    assert_eq!(fields[6], medians.handshake_total().to_string());
    assert_eq!(
        medians.handshake_total(),
        medians.encapsulation + medians.decapsulation
    );
}

#[test]
fn self_check_passes_for_real_curves() {
    for algorithm in Algorithm::ALL {
        let kem = algorithm.build();
        let mut state = KemState::for_descriptor(kem.descriptor()).unwrap();
        self_check(&kem, &mut state).unwrap();
        assert!(state.secrets_match());
        assert!(state.shared_secret().iter().any(|&b| b != 0));

        state.wipe();
        assert!(state.is_wiped());
    }
}

#[test]
fn phases_chain_through_shared_state() {
    let kem = Algorithm::Ecdh384.build();
    let mut state = KemState::for_descriptor(kem.descriptor()).unwrap();

    KemOperation::keygen(&kem, &mut state).invoke().unwrap();
    let pk = state.public_key().to_vec();
    assert_eq!(pk[0], 0x04, "uncompressed SEC1 point");

    KemOperation::encapsulate(&kem, &mut state).invoke().unwrap();
    KemOperation::decapsulate(&kem, &mut state).invoke().unwrap();
    assert!(state.secrets_match());

    // A fresh key pair invalidates the old ciphertext's secret.
    KemOperation::keygen(&kem, &mut state).invoke().unwrap();
    assert_ne!(state.public_key(), pk.as_slice());
    KemOperation::decapsulate(&kem, &mut state).invoke().unwrap();
    assert!(!state.secrets_match());
}

#[test]
fn encapsulating_before_keygen_is_rejected() {
    // All-zero buffers are not a valid SEC1 point, so encapsulation
    // against an untouched state must fail rather than time garbage.
    let kem = Algorithm::Ecdh256.build();
    let mut state = KemState::for_descriptor(kem.descriptor()).unwrap();
    let err = KemOperation::encapsulate(&kem, &mut state).invoke().unwrap_err();
    assert_eq!(err.to_string(), "malformed public key");

    // The full self-check regenerates keys first and succeeds.
    assert!(!matches!(
        self_check(&kem, &mut state),
        Err(SelfCheckError::SharedSecretMismatch { .. })
    ));
}

#[test]
fn state_debug_never_prints_key_bytes() {
    let kem = Algorithm::Ecdh256.build();
    let mut state = KemState::for_descriptor(kem.descriptor()).unwrap();
    self_check(&kem, &mut state).unwrap();

    let debug = format!("{state:?}");
    assert!(debug.contains("[32 bytes, redacted]"));
    let hex: String = state.shared_secret()[..4]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    assert!(!debug.contains(&hex));
}
