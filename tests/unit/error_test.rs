//! Tests for error types

use access_broker::core::{AdmissionError, BrokerError, DeclineReason};

#[test]
fn test_config_error() {
    let err = BrokerError::Config("resource_count must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: resource_count must be greater than 0"
    );
    assert!(err.is_fatal());
}

#[test]
fn test_parse_error() {
    let err = BrokerError::parse("expected 4 fields, found 2");
    assert_eq!(format!("{}", err), "malformed request: expected 4 fields, found 2");
    assert!(!err.is_fatal());
}

#[test]
fn test_invalid_resource_error() {
    let err = BrokerError::InvalidResource {
        resource_id: 7,
        reason: DeclineReason::Deleted,
    };
    assert_eq!(format!("{}", err), "invalid resource 7: deleted");
    assert!(!err.is_fatal());
}

#[test]
fn test_admission_timeout_error() {
    let err = BrokerError::AdmissionTimeout;
    assert_eq!(format!("{}", err), "admission timed out");
    assert!(!err.is_fatal());
}

#[test]
fn test_io_error_is_fatal() {
    let err = BrokerError::from(std::io::Error::other("pipe closed"));
    assert_eq!(format!("{}", err), "i/o error: pipe closed");
    assert!(err.is_fatal());
}

#[test]
fn test_decline_reason_display() {
    assert_eq!(DeclineReason::Unknown.to_string(), "does not exist");
    assert_eq!(DeclineReason::Deleted.to_string(), "deleted");
}

#[test]
fn test_admission_error_converts() {
    let declined = AdmissionError::InvalidResource {
        resource_id: 4,
        reason: DeclineReason::Unknown,
    };
    assert_eq!(declined.to_string(), "resource 4 does not exist");
    assert!(matches!(
        BrokerError::from(declined),
        BrokerError::InvalidResource {
            resource_id: 4,
            reason: DeclineReason::Unknown
        }
    ));
    assert!(matches!(
        BrokerError::from(AdmissionError::Timeout),
        BrokerError::AdmissionTimeout
    ));
}
