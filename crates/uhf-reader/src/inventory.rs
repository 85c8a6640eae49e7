//! Continuous inventory engine.
//!
//! The engine runs one polling task per scan session. The task drains the
//! reader's tag buffer and forwards what it finds to the [`ResultSink`]:
//!
//! - **Discover** (no target): each EPC is reported once. The seen set
//!   survives start/stop and is only emptied by [`InventoryEngine::clear_seen_tags`].
//! - **Locate** (target EPC): every read of the target is reported, duplicates
//!   included, so the host can follow its RSSI while homing in on the tag.
//!
//! # Lifecycle
//!
//! ```text
//!        start_inventory()              stop_inventory()
//! Idle ─────────────────────► Running ─────────────────────► Idle
//!                               │
//!                               └─ polling task: lock reader → poll → dispatch
//!                                  (backs off on an empty buffer, exits on
//!                                   cancellation)
//! ```
//!
//! Starting and stopping are serialized through the session slot. A stop
//! cancels the session token, halts the reader, and waits up to the configured
//! grace period for the task to exit before aborting it, so no discovery event
//! is emitted after `stop_inventory` returns.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, trace, warn};
use uhf_hardware::TagRecord;
use uuid::Uuid;

use crate::config::{OverlapPolicy, ReaderConfig};
use crate::error::{ReaderError, Result};
use crate::handle::SharedReader;
use crate::sink::{ReaderEvent, ResultSink};

/// EPCs reported during discovery, shared with the polling task.
#[derive(Debug, Clone, Default)]
pub struct SeenTags {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl SeenTags {
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an EPC. Returns `true` if it had not been seen before.
    pub fn insert(&self, epc: &str) -> bool {
        let mut seen = self.lock();
        if seen.contains(epc) {
            return false;
        }
        seen.insert(epc.to_string())
    }

    /// Forget an EPC so its next read is reported again.
    pub fn remove(&self, epc: &str) -> bool {
        self.lock().remove(epc)
    }

    pub fn contains(&self, epc: &str) -> bool {
        self.lock().contains(epc)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// How a session decides which reads to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanMode {
    /// Report each EPC once.
    Discover,

    /// Report every read of one EPC.
    Locate(String),
}

impl ScanMode {
    /// Build a mode from an optional target. An empty target means discovery.
    pub fn from_target(target: Option<String>) -> Self {
        match target {
            Some(epc) if !epc.is_empty() => Self::Locate(epc),
            _ => Self::Discover,
        }
    }

    /// Decide whether `tag` is reported, updating `seen` in discovery mode.
    pub fn admit(&self, tag: &TagRecord, seen: &SeenTags) -> bool {
        match self {
            Self::Discover => seen.insert(&tag.epc),
            Self::Locate(target) => tag.epc == *target,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Discover => None,
            Self::Locate(epc) => Some(epc),
        }
    }
}

/// A running scan session.
#[derive(Debug)]
struct ScanSession {
    id: Uuid,
    mode: ScanMode,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ScanSession {
    fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }
}

/// The continuous inventory engine.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use uhf_hardware::mock::MockUhfReader;
/// use uhf_reader::config::ReaderConfig;
/// use uhf_reader::handle::ReaderHandle;
/// use uhf_reader::inventory::InventoryEngine;
/// use uhf_reader::sink::ChannelSink;
///
/// #[tokio::main]
/// async fn main() -> uhf_reader::Result<()> {
///     let (device, mock) = MockUhfReader::new();
///     let reader = ReaderHandle::new(device, Default::default()).into_shared();
///     reader.lock().await.power_on().await?;
///
///     let (sink, mut events) = ChannelSink::new(64);
///     let engine = InventoryEngine::new(reader, Arc::new(sink), &ReaderConfig::default());
///
///     assert!(engine.start_inventory(None).await?);
///     mock.feed_epcs(&["E1", "E1", "E2"], -50.0).await.unwrap();
///
///     events.recv().await.unwrap();
///     events.recv().await.unwrap();
///     assert_eq!(engine.stop_inventory().await?, 2);
///     Ok(())
/// }
/// ```
pub struct InventoryEngine {
    reader: SharedReader,
    sink: Arc<dyn ResultSink>,
    seen: SeenTags,
    session: tokio::sync::Mutex<Option<ScanSession>>,
    idle_backoff: Duration,
    stop_grace_period: Duration,
    overlap_policy: OverlapPolicy,
}

impl InventoryEngine {
    /// Create an idle engine over a shared reader.
    pub fn new(reader: SharedReader, sink: Arc<dyn ResultSink>, config: &ReaderConfig) -> Self {
        Self {
            reader,
            sink,
            seen: SeenTags::default(),
            session: tokio::sync::Mutex::new(None),
            idle_backoff: config.idle_backoff(),
            stop_grace_period: config.stop_grace_period(),
            overlap_policy: config.overlap_policy,
        }
    }

    /// Start continuous inventory, optionally locating a single EPC.
    ///
    /// Returns `Ok(false)` without spawning anything if the reader refuses to
    /// start continuous read.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::NotInitialized`] if the reader is not powered on
    /// - [`ReaderError::InventoryActive`] if a session is running and the
    ///   overlap policy is `Reject`
    pub async fn start_inventory(&self, target: Option<String>) -> Result<bool> {
        let mut slot = self.session.lock().await;

        if let Some(active) = slot.take() {
            if active.is_active() {
                match self.overlap_policy {
                    OverlapPolicy::Reject => {
                        warn!("Inventory start refused: session {} is running", active.id);
                        *slot = Some(active);
                        return Err(ReaderError::InventoryActive);
                    }
                    OverlapPolicy::Restart => {
                        info!("Restarting inventory: stopping session {}", active.id);
                        self.end_session(active).await;
                    }
                }
            } else {
                // Finished on its own or already cancelled: just reap it.
                self.join_session(active).await;
            }
        }

        let started = self.reader.lock().await.start_continuous_read().await?;
        if !started {
            warn!("Reader refused to start continuous read");
            return Ok(false);
        }

        let mode = ScanMode::from_target(target);
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let span = info_span!("inventory", session = %id, target = ?mode.target());

        let task = tokio::spawn(
            poll_loop(
                Arc::clone(&self.reader),
                Arc::clone(&self.sink),
                self.seen.clone(),
                mode.clone(),
                cancel.clone(),
                self.idle_backoff,
            )
            .instrument(span),
        );

        info!("Inventory session {} started ({:?})", id, mode);
        *slot = Some(ScanSession {
            id,
            mode,
            cancel,
            task,
        });
        Ok(true)
    }

    /// Stop continuous inventory and return the number of distinct EPCs seen.
    ///
    /// Waits for the polling task to exit (at most the grace period, after
    /// which it is aborted). With no session running it still asks a ready
    /// reader to stop.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::NotInitialized`] if nothing is running and the
    /// reader is not powered on.
    pub async fn stop_inventory(&self) -> Result<usize> {
        let mut slot = self.session.lock().await;

        match slot.take() {
            Some(session) => self.end_session(session).await,
            None => {
                let mut reader = self.reader.lock().await;
                if !reader.is_ready() {
                    return Err(ReaderError::NotInitialized);
                }
                if let Ok(false) | Err(_) = reader.stop_continuous_read().await {
                    warn!("Reader did not confirm continuous read stop");
                }
            }
        }

        Ok(self.seen.len())
    }

    /// Cancel, halt the reader, and wait for the task.
    ///
    /// Cancelling drops the task's in-flight poll, which frees the reader
    /// lock. Each wait below is bounded by the grace period.
    async fn end_session(&self, session: ScanSession) {
        session.cancel.cancel();

        match tokio::time::timeout(self.stop_grace_period, self.reader.lock()).await {
            Ok(mut reader) => {
                if reader.is_ready() {
                    match reader.stop_continuous_read().await {
                        Ok(true) => {}
                        Ok(false) => warn!("Reader refused to stop continuous read"),
                        Err(e) => warn!("Stopping continuous read failed: {}", e),
                    }
                }
            }
            Err(_) => warn!(
                "Reader still busy after {}ms, skipping continuous read stop",
                self.stop_grace_period.as_millis()
            ),
        }

        self.join_session(session).await;
    }

    async fn join_session(&self, mut session: ScanSession) {
        session.cancel.cancel();

        let outcome = tokio::time::timeout(self.stop_grace_period, &mut session.task).await;
        match outcome {
            Ok(Ok(())) => {
                info!("Inventory session {} stopped ({:?})", session.id, session.mode);
            }
            Ok(Err(e)) if e.is_panic() => {
                error!("Inventory session {} panicked", session.id);
            }
            Ok(Err(_)) => {}
            Err(_) => {
                warn!(
                    "Inventory session {} did not stop within {}ms, aborting",
                    session.id,
                    self.stop_grace_period.as_millis()
                );
                session.task.abort();
                let _ = session.task.await;
            }
        }
    }

    /// Forget every EPC seen so far. Does not affect a running locate session.
    pub fn clear_seen_tags(&self) {
        self.seen.clear();
        debug!("Seen tag set cleared");
    }

    /// Number of distinct EPCs reported in discovery mode since the last clear.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Whether a session is running.
    pub async fn is_running(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .is_some_and(ScanSession::is_active)
    }

    /// Target of the running session, if it is a locate session.
    pub async fn target(&self) -> Option<String> {
        self.session
            .lock()
            .await
            .as_ref()
            .filter(|s| s.is_active())
            .and_then(|s| s.mode.target().map(str::to_string))
    }

    /// Read exactly one tag outside continuous mode and report it.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::InventoryActive`] while a session is running
    /// - [`ReaderError::NotInitialized`] if the reader is not powered on
    /// - [`ReaderError::Read`] if no valid tag answered
    pub async fn read_single_tag(&self) -> Result<TagRecord> {
        let slot = self.session.lock().await;
        if slot.as_ref().is_some_and(ScanSession::is_active) {
            return Err(ReaderError::InventoryActive);
        }

        let tag = self.reader.lock().await.read_single_tag().await?;
        drop(slot);

        debug!("Single tag read: {}", tag.epc);
        if !self.sink.emit(ReaderEvent::TagRead(tag.clone())) {
            debug!("Single tag event for {} was not delivered", tag.epc);
        }
        Ok(tag)
    }
}

impl std::fmt::Debug for InventoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryEngine")
            .field("seen", &self.seen.len())
            .field("idle_backoff", &self.idle_backoff)
            .field("stop_grace_period", &self.stop_grace_period)
            .field("overlap_policy", &self.overlap_policy)
            .finish_non_exhaustive()
    }
}

/// Body of the polling task.
async fn poll_loop(
    reader: SharedReader,
    sink: Arc<dyn ResultSink>,
    seen: SeenTags,
    mode: ScanMode,
    cancel: CancellationToken,
    idle_backoff: Duration,
) {
    debug!("Polling task started");

    while !cancel.is_cancelled() {
        // The poll is raced too: cancellation drops it mid-call.
        let polled = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            polled = async { reader.lock().await.poll_buffer().await } => polled,
        };

        match polled {
            Ok(Some(tag)) => {
                if cancel.is_cancelled() {
                    break;
                }
                if let Err(e) = tag.validate() {
                    trace!("Discarding invalid buffer record: {}", e);
                    continue;
                }
                if mode.admit(&tag, &seen) {
                    trace!("Reporting {} ({} dBm)", tag.epc, tag.rssi);
                    if !sink.emit(ReaderEvent::discovered(&tag)) && mode == ScanMode::Discover {
                        // Undelivered: the next read of this EPC reports it.
                        seen.remove(&tag.epc);
                    }
                } else {
                    trace!("Skipping {}", tag.epc);
                }
            }
            Ok(None) => idle(&cancel, idle_backoff).await,
            Err(e) => {
                debug!("Buffer poll failed, retrying: {}", e);
                idle(&cancel, idle_backoff).await;
            }
        }
    }

    debug!("Polling task exiting");
}

/// Back off between empty polls, waking early on cancellation.
async fn idle(cancel: &CancellationToken, backoff: Duration) {
    if backoff.is_zero() {
        tokio::task::yield_now().await;
        return;
    }
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = tokio::time::sleep(backoff) => {}
    }
}
