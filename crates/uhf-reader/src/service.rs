//! Host-facing reader service.
//!
//! [`UhfReaderService`] is the command surface a host bridge binds to. It owns
//! the shared reader, the inventory engine and the result sink, and maps each
//! host command onto them:
//!
//! | Command                   | Behavior                                           |
//! |---------------------------|----------------------------------------------------|
//! | `initialize_reader`       | spawned power-on, reported on `power-status`       |
//! | `deinitialize_reader`     | spawned power-off (stops inventory first)          |
//! | `read_power`              | current transmit power                             |
//! | `change_power`            | set transmit power                                 |
//! | `read_single_tag`         | one tag, also emitted on `tag-discovered`          |
//! | `start_reading_tags`      | discovery session                                  |
//! | `find_tag`                | locate session for one EPC                         |
//! | `stop_reading_tags`       | stop, returns distinct EPC count                   |
//! | `clear_all_tags`          | forget seen EPCs                                   |
//! | `write_data_into_epc`     | validated EPC write                                |
//! | `on_host_destroy`         | best-effort teardown, never fails                  |
//!
//! Power transitions run on spawned tasks so the caller never waits on
//! hardware; the returned [`JoinHandle`]s may be awaited or dropped.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uhf_hardware::{AnyUhfDevice, DeviceInfo, TagRecord};

use crate::config::ReaderConfig;
use crate::epc::EpcPayload;
use crate::error::{ReaderError, Result};
use crate::handle::{ReaderHandle, ReaderState, SharedReader};
use crate::inventory::InventoryEngine;
use crate::sink::{ChannelSink, EventStream, ReaderEvent, ResultSink};

/// Status reported after a successful power-on.
pub const STATUS_POWER_ON: &str = "success: power on";

/// Status reported when the handshake fails after acquisition.
pub const STATUS_INIT_FAILED: &str = "failed: init error";

/// Status reported after a successful power-off.
pub const STATUS_POWER_OFF: &str = "success: power off";

/// The host-facing reader service.
///
/// # Examples
///
/// ```
/// use uhf_hardware::mock::MockUhfReader;
/// use uhf_reader::config::ReaderConfig;
/// use uhf_reader::service::UhfReaderService;
///
/// #[tokio::main]
/// async fn main() -> uhf_reader::Result<()> {
///     let (device, mock) = MockUhfReader::new();
///     let (service, mut events) = UhfReaderService::with_channel(device, ReaderConfig::default())?;
///
///     service.initialize_reader().await.unwrap()?;
///     let status = events.recv().await.unwrap();
///     assert_eq!(status.name(), "power-status");
///
///     service.start_reading_tags().await?;
///     mock.feed_epcs(&["E200001", "E200002"], -47.0).await.unwrap();
///     events.recv().await.unwrap();
///     events.recv().await.unwrap();
///
///     assert_eq!(service.stop_reading_tags().await?, 2);
///     service.deinitialize_reader().await.unwrap()?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct UhfReaderService {
    reader: SharedReader,
    engine: Arc<InventoryEngine>,
    sink: Arc<dyn ResultSink>,
    config: Arc<ReaderConfig>,
}

impl UhfReaderService {
    /// Create a service delivering events to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Config`] if the configuration is invalid.
    pub fn new(
        device: impl Into<AnyUhfDevice>,
        config: ReaderConfig,
        sink: Arc<dyn ResultSink>,
    ) -> Result<Self> {
        config.validate()?;

        let reader = ReaderHandle::new(device, config.read_mode).into_shared();
        let engine = Arc::new(InventoryEngine::new(
            Arc::clone(&reader),
            Arc::clone(&sink),
            &config,
        ));

        Ok(Self {
            reader,
            engine,
            sink,
            config: Arc::new(config),
        })
    }

    /// Create a service with a [`ChannelSink`] sized by `event_capacity`.
    pub fn with_channel(
        device: impl Into<AnyUhfDevice>,
        config: ReaderConfig,
    ) -> Result<(Self, EventStream)> {
        config.validate()?;
        let (sink, events) = ChannelSink::new(config.event_capacity);
        let service = Self::new(device, config, Arc::new(sink))?;
        Ok((service, events))
    }

    /// Service configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Current reader lifecycle state.
    pub async fn reader_state(&self) -> ReaderState {
        self.reader.lock().await.state()
    }

    /// Reader metadata.
    pub async fn reader_info(&self) -> Result<DeviceInfo> {
        self.reader.lock().await.info().await
    }

    /// Whether an inventory session is running.
    pub async fn is_reading(&self) -> bool {
        self.engine.is_running().await
    }

    /// Power the reader on in the background.
    ///
    /// The outcome is reported on `power-status`: `"success: power on"`,
    /// `"failed: init error"`, or the acquisition failure detail.
    pub fn initialize_reader(&self) -> JoinHandle<Result<()>> {
        info!("Initializing reader");
        let reader = Arc::clone(&self.reader);
        let sink = Arc::clone(&self.sink);

        tokio::spawn(async move {
            let result = reader.lock().await.power_on().await;
            let status = match &result {
                Ok(()) => STATUS_POWER_ON.to_string(),
                Err(ReaderError::Init(_)) => STATUS_INIT_FAILED.to_string(),
                Err(e) => e.to_string(),
            };
            sink.emit(ReaderEvent::power_status(status));
            result
        })
    }

    /// Power the reader off in the background, stopping inventory first.
    ///
    /// Succeeds (and reports `"success: power off"`) when nothing is held.
    pub fn deinitialize_reader(&self) -> JoinHandle<Result<()>> {
        info!("Deinitializing reader");
        let this = self.clone();
        tokio::spawn(async move { this.power_off().await })
    }

    async fn power_off(&self) -> Result<()> {
        if self.engine.is_running().await {
            if let Err(e) = self.engine.stop_inventory().await {
                warn!("Stopping inventory before power-off failed: {}", e);
            }
        }

        let result = self.reader.lock().await.power_off().await;
        let status = match &result {
            Ok(()) => STATUS_POWER_OFF.to_string(),
            Err(e) => format!("failed: {}", e),
        };
        self.sink.emit(ReaderEvent::power_status(status));
        result
    }

    /// Best-effort teardown for host destruction. Never fails.
    pub fn on_host_destroy(&self) -> JoinHandle<()> {
        info!("Host destroyed, releasing reader");
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.power_off().await {
                error!("Reader teardown failed: {}", e);
            }
        })
    }

    /// Current transmit power.
    pub async fn read_power(&self) -> Result<u32> {
        self.reader.lock().await.read_power_level().await
    }

    /// Set transmit power. Resolves `true` on success.
    pub async fn change_power(&self, value: i32) -> Result<bool> {
        self.reader.lock().await.set_power_level(value).await?;
        Ok(true)
    }

    /// Read one tag outside continuous mode.
    pub async fn read_single_tag(&self) -> Result<TagRecord> {
        self.engine.read_single_tag().await
    }

    /// Start a discovery session. Resolves the reader's running flag.
    pub async fn start_reading_tags(&self) -> Result<bool> {
        self.engine.start_inventory(None).await
    }

    /// Start a locate session for `epc`. An empty EPC starts discovery.
    pub async fn find_tag(&self, epc: impl Into<String>) -> Result<bool> {
        self.engine.start_inventory(Some(epc.into())).await
    }

    /// Stop the running session. Resolves the distinct EPC count.
    pub async fn stop_reading_tags(&self) -> Result<usize> {
        self.engine.stop_inventory().await
    }

    /// Forget every EPC seen so far.
    pub fn clear_all_tags(&self) {
        self.engine.clear_seen_tags();
    }

    /// Write a new 24-hex-character EPC into the tag in the field.
    ///
    /// The input is validated before the reader is touched.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Write`] for malformed input or a refused write.
    pub async fn write_data_into_epc(&self, epc: &str) -> Result<bool> {
        let payload = EpcPayload::parse(epc)?;
        let write = &self.config.write;

        self.reader
            .lock()
            .await
            .write_memory(
                write.access_password,
                write.bank,
                write.word_offset,
                write.word_count,
                payload.as_str(),
            )
            .await?;
        info!("EPC {} written", payload.epc());
        Ok(true)
    }
}
