//! Delivery of reader events to the host.
//!
//! [`ResultSink`] is the only contact point with the host bridge. The engine
//! calls [`ResultSink::emit`] from its polling task, so implementations must
//! return immediately. [`ChannelSink`] does that by handing events to a
//! bounded channel and dropping (and counting) them when the consumer lags.
//!
//! ```text
//! ┌──────────────┐  emit   ┌─────────────┐  recv   ┌──────────────┐
//! │ Polling task │────────►│ ChannelSink │────────►│ EventStream  │──► host
//! └──────────────┘         │  (mpsc)     │         └──────────────┘
//! ┌──────────────┐         │             │
//! │ Power tasks  │────────►│             │
//! └──────────────┘         └─────────────┘
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;
use uhf_hardware::TagRecord;

/// Event name for power lifecycle status.
pub const POWER_STATUS_EVENT: &str = "power-status";

/// Event name for tag discovery.
pub const TAG_DISCOVERED_EVENT: &str = "tag-discovered";

/// An event delivered to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReaderEvent {
    /// Human-readable power lifecycle status.
    PowerStatus { status: String },

    /// A tag found by continuous inventory.
    TagDiscovered { epc: String, rssi: f32 },

    /// The full record of a single-tag read.
    TagRead(TagRecord),
}

impl ReaderEvent {
    /// Build a power status event.
    pub fn power_status(status: impl Into<String>) -> Self {
        Self::PowerStatus {
            status: status.into(),
        }
    }

    /// Build a discovery event from a record.
    pub fn discovered(tag: &TagRecord) -> Self {
        Self::TagDiscovered {
            epc: tag.epc.clone(),
            rssi: tag.rssi,
        }
    }

    /// Channel the host bridge publishes this event on.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PowerStatus { .. } => POWER_STATUS_EVENT,
            Self::TagDiscovered { .. } | Self::TagRead(_) => TAG_DISCOVERED_EVENT,
        }
    }

    /// EPC carried by a tag event.
    pub fn epc(&self) -> Option<&str> {
        match self {
            Self::TagDiscovered { epc, .. } => Some(epc),
            Self::TagRead(tag) => Some(&tag.epc),
            Self::PowerStatus { .. } => None,
        }
    }
}

/// Fire-and-forget event delivery.
///
/// `emit` is called from the polling task and must never block it.
pub trait ResultSink: Send + Sync {
    /// Deliver one event. Returns `false` if the event was dropped.
    fn emit(&self, event: ReaderEvent) -> bool;
}

impl fmt::Debug for dyn ResultSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResultSink")
    }
}

/// Sink backed by a bounded tokio channel.
///
/// # Examples
///
/// ```
/// use uhf_reader::sink::{ChannelSink, ReaderEvent, ResultSink};
///
/// #[tokio::main]
/// async fn main() {
///     let (sink, mut events) = ChannelSink::new(16);
///     assert!(sink.emit(ReaderEvent::power_status("success: power on")));
///
///     let event = events.recv().await.unwrap();
///     assert_eq!(event.name(), "power-status");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<ReaderEvent>,
    dropped: Arc<AtomicU64>,
}

impl ChannelSink {
    /// Create a sink and the stream its events arrive on.
    pub fn new(capacity: usize) -> (Self, EventStream) {
        let (tx, rx) = mpsc::channel(capacity);
        let dropped = Arc::new(AtomicU64::new(0));

        let sink = Self {
            tx,
            dropped: Arc::clone(&dropped),
        };

        (sink, EventStream { rx, dropped })
    }
}

impl ResultSink for ChannelSink {
    fn emit(&self, event: ReaderEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    "Event channel full, dropping {} event ({} dropped so far)",
                    event.name(),
                    total
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }
}

/// Receiving side of a [`ChannelSink`].
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<ReaderEvent>,
    dropped: Arc<AtomicU64>,
}

impl EventStream {
    /// Receive the next event. Returns `None` once every sink is dropped.
    pub async fn recv(&mut self) -> Option<ReaderEvent> {
        self.rx.recv().await
    }

    /// Take an event if one is already queued.
    pub fn try_recv(&mut self) -> Option<ReaderEvent> {
        self.rx.try_recv().ok()
    }

    /// Take every queued event.
    pub fn drain(&mut self) -> Vec<ReaderEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Events lost because the channel was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
