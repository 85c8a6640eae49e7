//! Shared helpers for the reader integration tests.
//!
//! Every test drives a [`UhfReaderService`] over a [`MockUhfReader`]:
//!
//! - [`ready_service`] builds a powered-on service with a short idle backoff
//! - [`next_event`] / [`next_epcs`] wait for events with a timeout
//! - [`assert_quiet`] checks that nothing else arrives

#![allow(dead_code)]

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use uhf_hardware::mock::{MockUhfHandle, MockUhfReader};
use uhf_reader::sink::{EventStream, ReaderEvent};
use uhf_reader::{ReaderConfig, UhfReaderService};

/// How long a test waits for an expected event.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// How long a test watches for an event that must not arrive.
pub const QUIET_PERIOD: Duration = Duration::from_millis(60);

/// Install a test-writer subscriber, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Configuration tuned for tests: 1ms idle backoff.
pub fn test_config() -> ReaderConfig {
    ReaderConfig::default().with_idle_backoff(Duration::from_millis(1))
}

/// Build a service over a fresh mock without powering it on.
pub fn service(config: ReaderConfig) -> (UhfReaderService, EventStream, MockUhfHandle) {
    init_tracing();
    let (device, mock) = MockUhfReader::new();
    let (service, events) =
        UhfReaderService::with_channel(device, config).expect("valid test config");
    (service, events, mock)
}

/// Build a powered-on service and consume the power-on status.
pub async fn ready_service(config: ReaderConfig) -> (UhfReaderService, EventStream, MockUhfHandle) {
    let (service, mut events, mock) = service(config);
    service
        .initialize_reader()
        .await
        .expect("power-on task")
        .expect("power-on");

    match next_event(&mut events).await {
        ReaderEvent::PowerStatus { status } => assert_eq!(status, "success: power on"),
        other => panic!("expected power status, got {:?}", other),
    }
    (service, events, mock)
}

/// Wait for the next event.
pub async fn next_event(events: &mut EventStream) -> ReaderEvent {
    tokio::time::timeout(EVENT_TIMEOUT, events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event stream closed")
}

/// Wait for `count` tag events and return their EPCs in order.
pub async fn next_epcs(events: &mut EventStream, count: usize) -> Vec<String> {
    let mut epcs = Vec::with_capacity(count);
    while epcs.len() < count {
        let event = next_event(events).await;
        let epc = event
            .epc()
            .unwrap_or_else(|| panic!("expected tag event, got {:?}", event));
        epcs.push(epc.to_string());
    }
    epcs
}

/// Assert that no event arrives within [`QUIET_PERIOD`].
pub async fn assert_quiet(events: &mut EventStream) {
    tokio::time::sleep(QUIET_PERIOD).await;
    let pending = events.drain();
    assert!(pending.is_empty(), "unexpected events: {:?}", pending);
}
