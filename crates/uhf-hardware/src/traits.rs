//! UHF device trait definitions.
//!
//! This module defines the contract between the reader core and a vendor SDK
//! binding. The core never talks to the SDK directly: it drives a
//! [`UhfDevice`], which a real binding or the [`mock`](crate::mock) reader
//! implements.
//!
//! All traits use native `async fn` methods (Edition 2024 RPITIT), so they are
//! not object-safe. Concrete dispatch goes through
//! [`AnyUhfDevice`](crate::devices::AnyUhfDevice).

#![allow(async_fn_in_trait)]

use crate::error::{DeviceError, Result};
use crate::types::{AccessPassword, DeviceInfo, MemoryBank, ReadMode};
use serde::{Deserialize, Serialize};

/// One read event produced by the reader.
///
/// Records come straight from the SDK and are not validated on construction,
/// because a real SDK can and does hand back records with an empty EPC. Use
/// [`TagRecord::validate`] before trusting one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRecord {
    /// Electronic Product Code as an uppercase hex string.
    pub epc: String,

    /// Received signal strength in dBm.
    pub rssi: f32,

    /// Protocol-control word as a hex string.
    pub pc: String,

    /// Tag identifier bank content as a hex string (empty when not captured).
    pub tid: String,

    /// Local time the record was produced.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl TagRecord {
    /// Create a record with the given EPC and RSSI, empty PC/TID, and the
    /// current timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// use uhf_hardware::traits::TagRecord;
    ///
    /// let tag = TagRecord::new("E2003412B802011526603FE2", -48.5)
    ///     .with_pc("3000")
    ///     .with_tid("E2003412");
    /// assert!(tag.validate().is_ok());
    /// ```
    pub fn new(epc: impl Into<String>, rssi: f32) -> Self {
        Self {
            epc: epc.into(),
            rssi,
            pc: String::new(),
            tid: String::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Set the protocol-control word.
    pub fn with_pc(mut self, pc: impl Into<String>) -> Self {
        self.pc = pc.into();
        self
    }

    /// Set the TID content.
    pub fn with_tid(mut self, tid: impl Into<String>) -> Self {
        self.tid = tid.into();
        self
    }

    /// Set a custom timestamp, for replaying captured reads.
    pub fn with_timestamp(mut self, timestamp: chrono::DateTime<chrono::Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Check that the EPC is present and made of hex digits.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::InvalidData`] if the EPC is empty or contains a
    /// non-hex character.
    pub fn validate(&self) -> Result<()> {
        if self.epc.is_empty() {
            return Err(DeviceError::invalid_data("EPC is empty"));
        }
        if let Some(c) = self.epc.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(DeviceError::invalid_data(format!(
                "EPC contains non-hex character '{}'",
                c
            )));
        }
        Ok(())
    }

    /// Number of 16-bit words in the EPC.
    pub fn epc_words(&self) -> usize {
        self.epc.len() / 4
    }
}

/// UHF reader abstraction over a vendor SDK.
///
/// The method set mirrors what vendor SDKs for handheld UHF readers expose.
/// Boolean returns carry the SDK's own accept/refuse answer; `Err` is reserved
/// for the call itself failing (link down, device not acquired, etc.).
///
/// Every call may block on the hardware for the duration of the exchange, so
/// implementations backed by a blocking SDK should offload to a blocking pool.
///
/// # Examples
///
/// ```no_run
/// use uhf_hardware::traits::UhfDevice;
/// use uhf_hardware::types::ReadMode;
/// use uhf_hardware::error::Result;
///
/// async fn bring_up<D: UhfDevice>(device: &mut D) -> Result<i32> {
///     device.acquire().await?;
///     device.init().await?;
///     device.configure_mode(ReadMode::EpcAndTid).await?;
///     device.get_power().await
/// }
/// ```
pub trait UhfDevice: Send + Sync {
    /// Open the physical device.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Unavailable`] if the device is missing or busy.
    async fn acquire(&mut self) -> Result<()>;

    /// Release the physical device.
    async fn release(&mut self) -> Result<()>;

    /// Run the vendor init handshake on an acquired device.
    async fn init(&mut self) -> Result<()>;

    /// Select what each inventory round captures.
    async fn configure_mode(&mut self, mode: ReadMode) -> Result<()>;

    /// Current transmit power as reported by the SDK (negative means invalid).
    async fn get_power(&mut self) -> Result<i32>;

    /// Set transmit power. Returns the SDK's accept/refuse answer.
    async fn set_power(&mut self, level: i32) -> Result<bool>;

    /// Start the reader's internal continuous-read mode.
    async fn start_continuous_read(&mut self) -> Result<bool>;

    /// Stop the reader's internal continuous-read mode.
    async fn stop_continuous_read(&mut self) -> Result<bool>;

    /// Take the next record from the reader's inventory buffer, if any.
    async fn poll_buffer(&mut self) -> Result<Option<TagRecord>>;

    /// Run a single inventory round and return one tag, if any answered.
    async fn read_one_tag(&mut self) -> Result<Option<TagRecord>>;

    /// Write `word_count` 16-bit words of hex `data` into `bank` at word
    /// `offset`. Returns the SDK's accept/refuse answer.
    async fn write_memory(
        &mut self,
        password: AccessPassword,
        bank: MemoryBank,
        offset: u16,
        word_count: u16,
        data: &str,
    ) -> Result<bool>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
