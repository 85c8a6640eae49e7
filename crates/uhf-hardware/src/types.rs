//! Common types shared across UHF device implementations.
//!
//! This module defines the small value types that travel through the SDK
//! contract: device metadata, read modes, memory banks and access passwords.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic device information.
///
/// Contains metadata about a reader such as name, model, serial number,
/// and firmware version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "C72 UHF", "Mock UHF Reader").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional device serial number.
    pub serial_number: Option<String>,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            serial_number: None,
            firmware_version: None,
        }
    }

    /// Set the serial number.
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// What the reader captures for each inventoried tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    /// EPC bank only.
    Epc,

    /// EPC and TID captured in the same inventory round.
    #[default]
    EpcAndTid,
}

/// Tag memory banks addressable by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryBank {
    /// Reserved bank (kill and access passwords).
    Reserved,

    /// EPC bank (CRC, PC and EPC words).
    Epc,

    /// Tag identifier bank.
    Tid,

    /// User memory.
    User,
}

impl MemoryBank {
    /// Bank number as used on the air interface.
    pub fn number(&self) -> u8 {
        match self {
            Self::Reserved => 0,
            Self::Epc => 1,
            Self::Tid => 2,
            Self::User => 3,
        }
    }
}

impl fmt::Display for MemoryBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved => write!(f, "RESERVED"),
            Self::Epc => write!(f, "EPC"),
            Self::Tid => write!(f, "TID"),
            Self::User => write!(f, "USER"),
        }
    }
}

/// 32-bit access password gating tag memory writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessPassword(pub u32);

impl AccessPassword {
    /// The factory default password.
    pub const ZERO: Self = Self(0);

    /// Password as the 8 hex characters vendor SDKs expect.
    pub fn to_hex(&self) -> String {
        format!("{:08X}", self.0)
    }
}

impl fmt::Display for AccessPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
