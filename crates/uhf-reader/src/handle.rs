//! Reader connection lifecycle.
//!
//! [`ReaderHandle`] owns the device and tracks where it is in its power
//! lifecycle:
//!
//! ```text
//!                 power_on()                 ok
//! NotConnected ─────────────► PoweringOn ─────────► Ready
//!      ▲                          │                   │
//!      │      acquire/init failed │                   │ power_off()
//!      └──────────────────────────┘                   ▼
//!      └─────────────────────────────────────── PoweringOff
//! ```
//!
//! Everything except `power_on`/`power_off` requires `Ready` and otherwise
//! fails with [`ReaderError::NotInitialized`]. The handle is shared between
//! the service and the polling task as a [`SharedReader`]; every hardware
//! call happens under that mutex, so a power transition can never overlap an
//! in-flight poll.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uhf_hardware::{
    AccessPassword, AnyUhfDevice, DeviceInfo, MemoryBank, ReadMode, TagRecord, UhfDevice,
};

use crate::error::{ReaderError, Result};

/// A reader handle shared between the service and the polling task.
pub type SharedReader = Arc<Mutex<ReaderHandle>>;

/// Power lifecycle state of a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// No device held.
    NotConnected,

    /// Acquisition and handshake in progress.
    PoweringOn,

    /// Device held, initialized and configured.
    Ready,

    /// Release in progress.
    PoweringOff,
}

impl fmt::Display for ReaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "NotConnected"),
            Self::PoweringOn => write!(f, "PoweringOn"),
            Self::Ready => write!(f, "Ready"),
            Self::PoweringOff => write!(f, "PoweringOff"),
        }
    }
}

/// Owner of the physical reader connection.
#[derive(Debug)]
pub struct ReaderHandle {
    device: AnyUhfDevice,
    state: ReaderState,
    read_mode: ReadMode,
}

impl ReaderHandle {
    /// Wrap a device. The handle starts `NotConnected`.
    pub fn new(device: impl Into<AnyUhfDevice>, read_mode: ReadMode) -> Self {
        Self {
            device: device.into(),
            state: ReaderState::NotConnected,
            read_mode,
        }
    }

    /// Move the handle behind a shared mutex.
    pub fn into_shared(self) -> SharedReader {
        Arc::new(Mutex::new(self))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Whether the reader is powered on and configured.
    pub fn is_ready(&self) -> bool {
        self.state == ReaderState::Ready
    }

    fn require_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(ReaderError::NotInitialized)
        }
    }

    /// Acquire the device, run the handshake, and configure the read mode.
    ///
    /// A no-op when already `Ready`. If the handshake or configuration fails
    /// the device is released again and the handle returns to
    /// `NotConnected`.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::PowerOn`] if the device cannot be acquired
    /// - [`ReaderError::Init`] if the handshake or configuration fails
    pub async fn power_on(&mut self) -> Result<()> {
        if self.is_ready() {
            debug!("Reader already powered on");
            return Ok(());
        }

        info!("Powering on reader");
        self.state = ReaderState::PoweringOn;

        if let Err(e) = self.device.acquire().await {
            warn!("Reader acquisition failed: {}", e);
            self.state = ReaderState::NotConnected;
            return Err(ReaderError::power_on(e.to_string()));
        }

        if let Err(e) = self.handshake().await {
            warn!("Reader init failed: {}", e);
            if let Err(release_err) = self.device.release().await {
                warn!("Release after failed init also failed: {}", release_err);
            }
            self.state = ReaderState::NotConnected;
            return Err(ReaderError::init(e.to_string()));
        }

        self.state = ReaderState::Ready;
        info!("Reader ready (mode {:?})", self.read_mode);
        Ok(())
    }

    async fn handshake(&mut self) -> uhf_hardware::Result<()> {
        self.device.init().await?;
        self.device.configure_mode(self.read_mode).await
    }

    /// Release the device if one is held.
    ///
    /// Idempotent: with nothing held this succeeds without touching the SDK.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Release`] if the SDK fails to release; the
    /// handle then stays `Ready` so the release can be retried.
    pub async fn power_off(&mut self) -> Result<()> {
        if self.state == ReaderState::NotConnected {
            debug!("Reader already powered off");
            return Ok(());
        }

        info!("Powering off reader");
        self.state = ReaderState::PoweringOff;

        match self.device.release().await {
            Ok(()) => {
                self.state = ReaderState::NotConnected;
                info!("Reader released");
                Ok(())
            }
            Err(e) => {
                warn!("Reader release failed: {}", e);
                self.state = ReaderState::Ready;
                Err(ReaderError::release(e.to_string()))
            }
        }
    }

    /// Current transmit power.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Other`] if the SDK call fails or reports a
    /// negative value.
    pub async fn read_power_level(&mut self) -> Result<u32> {
        self.require_ready()?;

        let power = self
            .device
            .get_power()
            .await
            .map_err(|e| ReaderError::other(e.to_string()))?;
        debug!("Reader power level: {}", power);

        u32::try_from(power).map_err(|_| ReaderError::other("INVALID POWER VALUE"))
    }

    /// Set transmit power.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Other`] if the SDK rejects the value.
    pub async fn set_power_level(&mut self, value: i32) -> Result<()> {
        self.require_ready()?;

        let accepted = self
            .device
            .set_power(value)
            .await
            .map_err(|e| ReaderError::other(e.to_string()))?;
        if !accepted {
            warn!("Reader refused power level {}", value);
            return Err(ReaderError::other("Can't Change Power"));
        }
        info!("Reader power level set to {}", value);
        Ok(())
    }

    /// Ask the reader to start continuous read. Returns the SDK's answer.
    pub async fn start_continuous_read(&mut self) -> Result<bool> {
        self.require_ready()?;
        self.device
            .start_continuous_read()
            .await
            .map_err(|e| ReaderError::other(e.to_string()))
    }

    /// Ask the reader to stop continuous read. Returns the SDK's answer.
    pub async fn stop_continuous_read(&mut self) -> Result<bool> {
        self.require_ready()?;
        self.device
            .stop_continuous_read()
            .await
            .map_err(|e| ReaderError::other(e.to_string()))
    }

    /// Take the next buffered record, if any.
    pub async fn poll_buffer(&mut self) -> Result<Option<TagRecord>> {
        self.require_ready()?;
        self.device
            .poll_buffer()
            .await
            .map_err(|e| ReaderError::read(e.to_string()))
    }

    /// Read exactly one tag outside continuous mode.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Read`] if no tag answered or the EPC is invalid.
    pub async fn read_single_tag(&mut self) -> Result<TagRecord> {
        self.require_ready()?;

        let tag = self
            .device
            .read_one_tag()
            .await
            .map_err(|e| ReaderError::read(e.to_string()))?
            .ok_or_else(|| ReaderError::read("READ FAILED"))?;

        tag.validate()
            .map_err(|e| ReaderError::read(format!("READ FAILED: {}", e)))?;
        Ok(tag)
    }

    /// Write hex `data` into tag memory.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Write`] if the SDK call fails or refuses.
    pub async fn write_memory(
        &mut self,
        password: AccessPassword,
        bank: MemoryBank,
        offset: u16,
        word_count: u16,
        data: &str,
    ) -> Result<()> {
        self.require_ready()?;

        let accepted = self
            .device
            .write_memory(password, bank, offset, word_count, data)
            .await
            .map_err(|e| ReaderError::write(e.to_string()))?;
        if !accepted {
            warn!("Reader refused write to {} bank at word {}", bank, offset);
            return Err(ReaderError::write("Can't Write Data"));
        }
        info!("Wrote {} words to {} bank at word {}", word_count, bank, offset);
        Ok(())
    }

    /// Reader metadata.
    pub async fn info(&self) -> Result<DeviceInfo> {
        Ok(self.device.get_info().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uhf_hardware::mock::{MockUhfHandle, MockUhfReader};

    fn handle() -> (ReaderHandle, MockUhfHandle) {
        let (reader, mock) = MockUhfReader::new();
        (ReaderHandle::new(reader, ReadMode::EpcAndTid), mock)
    }

    #[tokio::test]
    async fn test_power_on_configures_epc_and_tid() {
        let (mut reader, mock) = handle();
        assert_eq!(reader.state(), ReaderState::NotConnected);

        reader.power_on().await.unwrap();

        assert_eq!(reader.state(), ReaderState::Ready);
        assert!(mock.is_acquired());
        assert_eq!(mock.read_mode(), Some(ReadMode::EpcAndTid));
    }

    #[tokio::test]
    async fn test_power_on_twice_is_noop() {
        let (mut reader, _mock) = handle();
        reader.power_on().await.unwrap();
        reader.power_on().await.unwrap();
        assert!(reader.is_ready());
    }

    #[tokio::test]
    async fn test_power_on_acquire_failure() {
        let (mut reader, mock) = handle();
        mock.set_acquire_failure(true);

        let err = reader.power_on().await.unwrap_err();
        assert!(matches!(err, ReaderError::PowerOn(_)));
        assert_eq!(reader.state(), ReaderState::NotConnected);
    }

    #[tokio::test]
    async fn test_power_on_init_failure_releases_device() {
        let (mut reader, mock) = handle();
        mock.set_init_failure(true);

        let err = reader.power_on().await.unwrap_err();
        assert!(matches!(err, ReaderError::Init(_)));
        assert_eq!(reader.state(), ReaderState::NotConnected);
        assert!(!mock.is_acquired());
        assert_eq!(mock.release_count(), 1);
    }

    #[tokio::test]
    async fn test_power_off_idempotent() {
        let (mut reader, mock) = handle();

        for _ in 0..3 {
            reader.power_off().await.unwrap();
        }
        assert_eq!(mock.release_count(), 0);

        reader.power_on().await.unwrap();
        reader.power_off().await.unwrap();
        reader.power_off().await.unwrap();
        assert_eq!(mock.release_count(), 1);
        assert_eq!(reader.state(), ReaderState::NotConnected);
    }

    #[tokio::test]
    async fn test_power_off_failure_keeps_device() {
        let (mut reader, mock) = handle();
        reader.power_on().await.unwrap();
        mock.set_release_failure(true);

        let err = reader.power_off().await.unwrap_err();
        assert!(matches!(err, ReaderError::Release(_)));
        assert!(reader.is_ready());

        mock.set_release_failure(false);
        reader.power_off().await.unwrap();
        assert_eq!(reader.state(), ReaderState::NotConnected);
    }

    #[tokio::test]
    async fn test_operations_require_ready() {
        let (mut reader, _mock) = handle();

        assert!(matches!(
            reader.read_power_level().await,
            Err(ReaderError::NotInitialized)
        ));
        assert!(matches!(
            reader.set_power_level(20).await,
            Err(ReaderError::NotInitialized)
        ));
        assert!(matches!(
            reader.read_single_tag().await,
            Err(ReaderError::NotInitialized)
        ));
        assert!(matches!(
            reader.poll_buffer().await,
            Err(ReaderError::NotInitialized)
        ));
        assert!(matches!(
            reader.start_continuous_read().await,
            Err(ReaderError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_power_level() {
        let (mut reader, mock) = handle();
        reader.power_on().await.unwrap();

        assert_eq!(reader.read_power_level().await.unwrap(), 30);
        reader.set_power_level(18).await.unwrap();
        assert_eq!(reader.read_power_level().await.unwrap(), 18);

        let err = reader.set_power_level(99).await.unwrap_err();
        assert!(matches!(err, ReaderError::Other(_)));

        mock.set_reported_power(-1);
        let err = reader.read_power_level().await.unwrap_err();
        assert_eq!(err.to_string(), "INVALID POWER VALUE");
    }

    #[tokio::test]
    async fn test_read_single_tag() {
        let (mut reader, mock) = handle();
        reader.power_on().await.unwrap();

        let err = reader.read_single_tag().await.unwrap_err();
        assert!(matches!(err, ReaderError::Read(_)));

        mock.queue_single_tag(TagRecord::new("", -40.0));
        let err = reader.read_single_tag().await.unwrap_err();
        assert!(matches!(err, ReaderError::Read(_)));

        mock.queue_single_tag(TagRecord::new("E200AA", -40.0).with_pc("1800"));
        let tag = reader.read_single_tag().await.unwrap();
        assert_eq!(tag.epc, "E200AA");
        assert_eq!(tag.pc, "1800");
    }

    #[tokio::test]
    async fn test_write_memory_refused() {
        let (mut reader, mock) = handle();
        reader.power_on().await.unwrap();
        mock.set_write_accepted(false);

        let err = reader
            .write_memory(AccessPassword::ZERO, MemoryBank::Epc, 2, 6, "AA")
            .await
            .unwrap_err();
        assert!(matches!(err, ReaderError::Write(_)));
    }

    #[tokio::test]
    async fn test_info_available_before_power_on() {
        let (reader, _mock) = handle();
        let info = reader.info().await.unwrap();
        assert_eq!(info.name, "Mock UHF Reader");
    }
}
