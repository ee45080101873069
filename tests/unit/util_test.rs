//! Tests for utility functions

use std::time::Duration;

use access_broker::util::{init_tracing, rounded_secs, Clock};

#[test]
fn test_rounded_secs_half_up() {
    assert_eq!(rounded_secs(Duration::from_millis(1_499)), 1);
    assert_eq!(rounded_secs(Duration::from_millis(1_500)), 2);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}

#[tokio::test(start_paused = true)]
async fn test_clock_offsets() {
    let clock = Clock::start();
    let target = clock.at(Duration::from_millis(1_250));
    tokio::time::sleep_until(target).await;
    assert_eq!(clock.elapsed(), Duration::from_millis(1_250));
}
