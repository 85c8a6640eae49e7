//! Error types for UHF device operations.
//!
//! This module defines the errors a vendor SDK binding can raise while talking
//! to the reader: the device could not be acquired, the handshake failed, the
//! link dropped, or the SDK returned something it should not have.

/// Result type alias for device operations.
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Errors that can occur during UHF device operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Device could not be found or is held by another process.
    #[error("Device unavailable: {device}")]
    Unavailable { device: String },

    /// Operation attempted on a device that has not been acquired.
    #[error("Device not acquired: {device}")]
    NotAcquired { device: String },

    /// Link-level communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from the SDK.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Vendor init handshake failed.
    #[error("Handshake failed: {message}")]
    HandshakeFailed { message: String },
}

impl DeviceError {
    /// Create a new unavailable error.
    pub fn unavailable(device: impl Into<String>) -> Self {
        Self::Unavailable {
            device: device.into(),
        }
    }

    /// Create a new not-acquired error.
    pub fn not_acquired(device: impl Into<String>) -> Self {
        Self::NotAcquired {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new handshake failure.
    pub fn handshake(message: impl Into<String>) -> Self {
        Self::HandshakeFailed {
            message: message.into(),
        }
    }
}
