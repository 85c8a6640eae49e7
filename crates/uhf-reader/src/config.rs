//! Reader configuration.
//!
//! [`ReaderConfig`] collects the knobs the core needs: what each inventory
//! round captures, how the polling loop backs off on an empty buffer, how long
//! a stop waits for the loop to exit, and the EPC write layout. Every field has
//! a default, so a partial JSON document is a valid configuration.
//!
//! # Examples
//!
//! ```
//! use uhf_reader::config::{OverlapPolicy, ReaderConfig};
//!
//! let config = ReaderConfig::from_json_str(r#"{ "idle_backoff_ms": 2 }"#).unwrap();
//! assert_eq!(config.idle_backoff_ms, 2);
//! assert_eq!(config.overlap_policy, OverlapPolicy::Reject);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uhf_hardware::{AccessPassword, MemoryBank, ReadMode};

use crate::error::{ReaderError, Result};

/// Default pause between empty buffer polls.
pub const DEFAULT_IDLE_BACKOFF_MS: u64 = 5;

/// Default time a stop waits for the polling task to exit.
pub const DEFAULT_STOP_GRACE_PERIOD_MS: u64 = 500;

/// Default capacity of the event hand-off channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// What to do when inventory is started while a session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Refuse the second start with `InventoryActive`.
    #[default]
    Reject,

    /// Stop the running session, then start the new one.
    Restart,
}

/// Layout of EPC writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteConfig {
    /// Access password sent with every write.
    pub access_password: AccessPassword,

    /// Bank written to.
    pub bank: MemoryBank,

    /// First word written (word 2 is the first EPC word, after CRC and PC).
    pub word_offset: u16,

    /// Number of 16-bit words written.
    pub word_count: u16,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            access_password: AccessPassword::ZERO,
            bank: MemoryBank::Epc,
            word_offset: 2,
            word_count: 6,
        }
    }
}

/// Configuration for a reader service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// What each inventory round captures.
    pub read_mode: ReadMode,

    /// Pause between empty polls, in milliseconds. `0` yields instead.
    pub idle_backoff_ms: u64,

    /// How long a stop waits for the polling task before aborting it.
    pub stop_grace_period_ms: u64,

    /// Capacity of the event channel created by `with_channel` constructors.
    pub event_capacity: usize,

    /// Behavior of a start while a session is running.
    pub overlap_policy: OverlapPolicy,

    /// EPC write layout.
    pub write: WriteConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            read_mode: ReadMode::EpcAndTid,
            idle_backoff_ms: DEFAULT_IDLE_BACKOFF_MS,
            stop_grace_period_ms: DEFAULT_STOP_GRACE_PERIOD_MS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            overlap_policy: OverlapPolicy::Reject,
            write: WriteConfig::default(),
        }
    }
}

impl ReaderConfig {
    /// Parse a configuration from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Config`] for malformed JSON or invalid values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ReaderError::config(format!("invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.stop_grace_period_ms == 0 {
            return Err(ReaderError::config(
                "stop_grace_period_ms must be greater than 0",
            ));
        }
        if self.event_capacity == 0 {
            return Err(ReaderError::config("event_capacity must be greater than 0"));
        }
        if self.write.word_count == 0 {
            return Err(ReaderError::config("write.word_count must be greater than 0"));
        }
        Ok(())
    }

    /// Set the idle backoff.
    pub fn with_idle_backoff(mut self, backoff: Duration) -> Self {
        self.idle_backoff_ms = backoff.as_millis() as u64;
        self
    }

    /// Set the stop grace period.
    pub fn with_stop_grace_period(mut self, grace: Duration) -> Self {
        self.stop_grace_period_ms = grace.as_millis() as u64;
        self
    }

    /// Set the overlap policy.
    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// Set the event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }

    pub fn stop_grace_period(&self) -> Duration {
        Duration::from_millis(self.stop_grace_period_ms)
    }
}
