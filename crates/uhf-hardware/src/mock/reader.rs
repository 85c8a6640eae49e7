//! Mock UHF reader implementation for testing and development.
//!
//! This module provides a simulated UHF reader that can be driven
//! programmatically: tags are fed into its inventory buffer through a
//! [`MockUhfHandle`], and every SDK answer (acquisition, handshake, power,
//! writes) can be switched to a failure.

use crate::{
    DeviceError, Result,
    traits::{TagRecord, UhfDevice},
    types::{AccessPassword, DeviceInfo, MemoryBank, ReadMode},
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;

/// Capacity of the simulated inventory buffer.
const BUFFER_CAPACITY: usize = 1024;

/// Transmit power range accepted by the simulated module, in dBm.
pub const MOCK_POWER_RANGE: std::ops::RangeInclusive<i32> = 5..=30;

/// A write the mock reader accepted or refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    /// Access password used.
    pub password: AccessPassword,
    /// Target bank.
    pub bank: MemoryBank,
    /// Word offset.
    pub offset: u16,
    /// Number of words.
    pub word_count: u16,
    /// Hex payload.
    pub data: String,
}

#[derive(Debug)]
struct MockState {
    acquired: bool,
    initialized: bool,
    continuous: bool,
    mode: Option<ReadMode>,
    power: i32,

    fail_acquire: bool,
    fail_init: bool,
    fail_release: bool,
    refuse_start: bool,
    accept_writes: bool,
    poll_delay: Duration,

    single_tags: VecDeque<TagRecord>,
    writes: Vec<WriteRecord>,
    polls: u64,
    releases: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            acquired: false,
            initialized: false,
            continuous: false,
            mode: None,
            power: 30,
            fail_acquire: false,
            fail_init: false,
            fail_release: false,
            refuse_start: false,
            poll_delay: Duration::ZERO,
            accept_writes: true,
            single_tags: VecDeque::new(),
            writes: Vec::new(),
            polls: 0,
            releases: 0,
        }
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock UHF reader for testing and development.
///
/// The buffer only yields records while continuous read is active, the same
/// way a real module only fills its buffer during inventory.
///
/// # Examples
///
/// ```
/// use uhf_hardware::mock::MockUhfReader;
/// use uhf_hardware::traits::{TagRecord, UhfDevice};
///
/// #[tokio::main]
/// async fn main() -> uhf_hardware::Result<()> {
///     let (mut reader, handle) = MockUhfReader::new();
///     reader.acquire().await?;
///     reader.init().await?;
///
///     handle.feed_tag(TagRecord::new("E2000017221101441890ABCD", -51.0)).await?;
///     assert!(reader.start_continuous_read().await?);
///
///     let tag = reader.poll_buffer().await?.unwrap();
///     assert_eq!(tag.epc, "E2000017221101441890ABCD");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockUhfReader {
    buffer_rx: mpsc::Receiver<TagRecord>,
    state: Arc<Mutex<MockState>>,
    name: String,
}

impl MockUhfReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns the reader and a handle used to feed tags and inject failures.
    pub fn new() -> (Self, MockUhfHandle) {
        Self::with_name("Mock UHF Reader".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockUhfHandle) {
        let (buffer_tx, buffer_rx) = mpsc::channel(BUFFER_CAPACITY);
        let state = Arc::new(Mutex::new(MockState::default()));

        let reader = Self {
            buffer_rx,
            state: Arc::clone(&state),
            name: name.clone(),
        };

        let handle = MockUhfHandle {
            buffer_tx,
            state,
            name,
        };

        (reader, handle)
    }

    fn require_acquired(&self) -> Result<MutexGuard<'_, MockState>> {
        let state = lock(&self.state);
        if !state.acquired {
            return Err(DeviceError::not_acquired(self.name.clone()));
        }
        Ok(state)
    }
}

impl Default for MockUhfReader {
    fn default() -> Self {
        Self::new().0
    }
}

impl UhfDevice for MockUhfReader {
    async fn acquire(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        if state.fail_acquire {
            return Err(DeviceError::unavailable(self.name.clone()));
        }
        state.acquired = true;
        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.releases += 1;
        if state.fail_release {
            return Err(DeviceError::communication("release refused by module"));
        }
        state.acquired = false;
        state.initialized = false;
        state.continuous = false;
        state.mode = None;
        Ok(())
    }

    async fn init(&mut self) -> Result<()> {
        let mut state = self.require_acquired()?;
        if state.fail_init {
            return Err(DeviceError::handshake("module did not answer init"));
        }
        state.initialized = true;
        Ok(())
    }

    async fn configure_mode(&mut self, mode: ReadMode) -> Result<()> {
        let mut state = self.require_acquired()?;
        state.mode = Some(mode);
        Ok(())
    }

    async fn get_power(&mut self) -> Result<i32> {
        Ok(self.require_acquired()?.power)
    }

    async fn set_power(&mut self, level: i32) -> Result<bool> {
        let mut state = self.require_acquired()?;
        if !MOCK_POWER_RANGE.contains(&level) {
            return Ok(false);
        }
        state.power = level;
        Ok(true)
    }

    async fn start_continuous_read(&mut self) -> Result<bool> {
        let mut state = self.require_acquired()?;
        if state.refuse_start || !state.initialized {
            return Ok(false);
        }
        state.continuous = true;
        Ok(true)
    }

    async fn stop_continuous_read(&mut self) -> Result<bool> {
        let mut state = self.require_acquired()?;
        state.continuous = false;
        Ok(true)
    }

    async fn poll_buffer(&mut self) -> Result<Option<TagRecord>> {
        let delay = {
            let mut state = self.require_acquired()?;
            state.polls += 1;
            state.poll_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if !lock(&self.state).continuous {
            return Ok(None);
        }
        Ok(self.buffer_rx.try_recv().ok())
    }

    async fn read_one_tag(&mut self) -> Result<Option<TagRecord>> {
        Ok(self.require_acquired()?.single_tags.pop_front())
    }

    async fn write_memory(
        &mut self,
        password: AccessPassword,
        bank: MemoryBank,
        offset: u16,
        word_count: u16,
        data: &str,
    ) -> Result<bool> {
        let mut state = self.require_acquired()?;
        let accepted = state.accept_writes;
        if accepted {
            state.writes.push(WriteRecord {
                password,
                bank,
                offset,
                word_count,
                data: data.to_string(),
            });
        }
        Ok(accepted)
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Simulated UHF module")
            .with_firmware_version("mock-1.0"))
    }
}

/// Handle for controlling a mock UHF reader.
///
/// Clones share the same reader: feeding a tag through any clone lands in the
/// one inventory buffer.
#[derive(Debug, Clone)]
pub struct MockUhfHandle {
    buffer_tx: mpsc::Sender<TagRecord>,
    state: Arc<Mutex<MockState>>,
    name: String,
}

impl MockUhfHandle {
    /// Push a record into the reader's inventory buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn feed_tag(&self, tag: TagRecord) -> Result<()> {
        self.buffer_tx
            .send(tag)
            .await
            .map_err(|_| DeviceError::unavailable(format!("{} buffer closed", self.name)))
    }

    /// Push one record per EPC into the inventory buffer, in order.
    pub async fn feed_epcs(&self, epcs: &[&str], rssi: f32) -> Result<()> {
        for epc in epcs {
            self.feed_tag(TagRecord::new(*epc, rssi)).await?;
        }
        Ok(())
    }

    /// Queue the answer to the next single-tag read.
    pub fn queue_single_tag(&self, tag: TagRecord) {
        lock(&self.state).single_tags.push_back(tag);
    }

    /// Make acquisition fail as if the device were missing or busy.
    pub fn set_acquire_failure(&self, fail: bool) {
        lock(&self.state).fail_acquire = fail;
    }

    /// Make the init handshake fail.
    pub fn set_init_failure(&self, fail: bool) {
        lock(&self.state).fail_init = fail;
    }

    /// Make release fail.
    pub fn set_release_failure(&self, fail: bool) {
        lock(&self.state).fail_release = fail;
    }

    /// Make the module refuse to start continuous read.
    pub fn set_start_refused(&self, refuse: bool) {
        lock(&self.state).refuse_start = refuse;
    }

    /// Make the module accept or refuse memory writes.
    pub fn set_write_accepted(&self, accept: bool) {
        lock(&self.state).accept_writes = accept;
    }

    /// Make every buffer poll take `delay`, like an SDK that waits for tags.
    pub fn set_poll_delay(&self, delay: Duration) {
        lock(&self.state).poll_delay = delay;
    }

    /// Force the raw power value the module reports (may be negative).
    pub fn set_reported_power(&self, power: i32) {
        lock(&self.state).power = power;
    }

    /// Writes the module accepted, in order.
    pub fn writes(&self) -> Vec<WriteRecord> {
        lock(&self.state).writes.clone()
    }

    /// Whether the device is currently acquired.
    pub fn is_acquired(&self) -> bool {
        lock(&self.state).acquired
    }

    /// Whether continuous read is active.
    pub fn is_continuous(&self) -> bool {
        lock(&self.state).continuous
    }

    /// Read mode configured by the last `configure_mode` call.
    pub fn read_mode(&self) -> Option<ReadMode> {
        lock(&self.state).mode
    }

    /// Number of buffer polls made so far.
    pub fn poll_count(&self) -> u64 {
        lock(&self.state).polls
    }

    /// Number of release calls made so far.
    pub fn release_count(&self) -> u64 {
        lock(&self.state).releases
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
