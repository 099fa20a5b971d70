use std::path::PathBuf;

use crate::{ConfwatchError, provider::ProviderError};

#[test]
fn provider_errors_convert() {
    let error: ConfwatchError = ProviderError::Parse {
        location: "config.toml".to_string(),
        details: "expected `]`".to_string(),
    }
    .into();

    assert!(matches!(
        error,
        ConfwatchError::Provider(ProviderError::Parse { .. })
    ));
}

#[test]
fn io_errors_carry_their_path() {
    let error = ConfwatchError::io("permission denied", "/var/log/confwatch");

    match &error {
        ConfwatchError::IoError { path, details } => {
            assert_eq!(path, &PathBuf::from("/var/log/confwatch"));
            assert_eq!(details, "permission denied");
        }
        other => unreachable!("Expected IoError, got {other:?}"),
    }
    assert_eq!(
        error.to_string(),
        "I/O error on '/var/log/confwatch': permission denied"
    );
}

#[test]
fn logging_errors_keep_details() {
    let error = ConfwatchError::logging("a global subscriber is already set");

    assert_eq!(
        error.to_string(),
        "failed to initialize logging: a global subscriber is already set"
    );
}
