//! Tests for broker builders

use std::time::Duration;

use access_broker::builders::BrokerBuilder;
use access_broker::config::BrokerConfig;
use access_broker::core::{BrokerError, InMemoryEventSink, DEFAULT_GRACE_PERIOD};

fn config(resource_count: u32, concurrency_limit: u32) -> BrokerConfig {
    BrokerConfig {
        read_secs: 1,
        write_secs: 1,
        delete_secs: 1,
        resource_count,
        concurrency_limit,
        timeout_secs: 3,
    }
}

#[tokio::test]
async fn test_build_broker() {
    let broker = BrokerBuilder::new(config(5, 3))
        .with_sink(Box::new(InMemoryEventSink::new(8)))
        .build()
        .unwrap();

    assert_eq!(broker.registry().len(), 5);
    assert_eq!(broker.registry().limit(), 3);
    assert_eq!(broker.grace_period(), DEFAULT_GRACE_PERIOD);
    assert_eq!(broker.config().timeout_secs, 3);
}

#[tokio::test]
async fn test_build_with_grace_period() {
    let broker = BrokerBuilder::new(config(1, 1))
        .with_sink(Box::new(InMemoryEventSink::new(8)))
        .with_grace_period(Duration::from_millis(250))
        .build()
        .unwrap();
    assert_eq!(broker.grace_period(), Duration::from_millis(250));
}

#[tokio::test]
async fn test_build_rejects_invalid_config() {
    let result = BrokerBuilder::new(config(0, 1))
        .with_sink(Box::new(InMemoryEventSink::new(8)))
        .build();
    assert!(matches!(result, Err(BrokerError::Config(_))));
}
