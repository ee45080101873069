//! Tests for configuration validation

use std::time::Duration;

use access_broker::config::BrokerConfig;
use access_broker::core::{BrokerError, Operation};

fn valid() -> BrokerConfig {
    BrokerConfig {
        read_secs: 2,
        write_secs: 3,
        delete_secs: 1,
        resource_count: 4,
        concurrency_limit: 2,
        timeout_secs: 5,
    }
}

#[test]
fn test_config_validation() {
    assert!(valid().validate().is_ok());
}

#[test]
fn test_config_invalid_resource_count() {
    let invalid = BrokerConfig {
        resource_count: 0,
        ..valid()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_limit() {
    let invalid = BrokerConfig {
        concurrency_limit: 0,
        ..valid()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_zero_durations_and_timeout_allowed() {
    let cfg = BrokerConfig {
        read_secs: 0,
        write_secs: 0,
        delete_secs: 0,
        timeout_secs: 0,
        ..valid()
    };
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.hold_duration(Operation::Write), Duration::ZERO);
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "read_secs": 2,
        "write_secs": 3,
        "delete_secs": 1,
        "resource_count": 4,
        "concurrency_limit": 2,
        "timeout_secs": 5
    }"#;

    let config = BrokerConfig::from_json_str(json).unwrap();
    assert_eq!(config, valid());
}

#[test]
fn test_config_from_json_invalid() {
    let json = r#"{
        "read_secs": 2,
        "write_secs": 3,
        "delete_secs": 1,
        "resource_count": 0,
        "concurrency_limit": 2,
        "timeout_secs": 5
    }"#;
    assert!(matches!(
        BrokerConfig::from_json_str(json),
        Err(BrokerError::Config(_))
    ));
}

#[test]
fn test_config_from_header_tokens() {
    let cfg = BrokerConfig::from_tokens(&["2", "3", "1", "4", "2", "5"]).unwrap();
    assert_eq!(cfg, valid());
}
