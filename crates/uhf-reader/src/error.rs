//! Error types for reader operations.
//!
//! Every host-facing operation fails with exactly one [`ReaderError`]
//! category carrying a human-readable detail. The categories map one-to-one
//! onto the stable codes the host bridge reports (see [`ReaderError::code`]).

use thiserror::Error;
use uhf_hardware::DeviceError;

/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Errors surfaced to the host application.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// Device acquisition failed (not found or busy).
    #[error("Power on failed: {0}")]
    PowerOn(String),

    /// Handshake or mode configuration failed after acquisition.
    #[error("Init failed: {0}")]
    Init(String),

    /// Single-tag or buffer read returned nothing usable.
    #[error("Read failed: {0}")]
    Read(String),

    /// Malformed write input or the SDK refused the write.
    #[error("Write failed: {0}")]
    Write(String),

    /// Device teardown failed.
    #[error("Release failed: {0}")]
    Release(String),

    /// Power query/set failures and unexpected SDK errors.
    #[error("{0}")]
    Other(String),

    /// Operation needs a powered-on reader.
    #[error("Reader not initialized")]
    NotInitialized,

    /// An inventory session is already running.
    #[error("Inventory already running")]
    InventoryActive,

    /// Invalid reader configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReaderError {
    /// Create a power-on error.
    pub fn power_on(detail: impl Into<String>) -> Self {
        Self::PowerOn(detail.into())
    }

    /// Create an init error.
    pub fn init(detail: impl Into<String>) -> Self {
        Self::Init(detail.into())
    }

    /// Create a read error.
    pub fn read(detail: impl Into<String>) -> Self {
        Self::Read(detail.into())
    }

    /// Create a write error.
    pub fn write(detail: impl Into<String>) -> Self {
        Self::Write(detail.into())
    }

    /// Create a release error.
    pub fn release(detail: impl Into<String>) -> Self {
        Self::Release(detail.into())
    }

    /// Create an uncategorized error.
    pub fn other(detail: impl Into<String>) -> Self {
        Self::Other(detail.into())
    }

    /// Create a configuration error.
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config(detail.into())
    }

    /// Stable code reported to the host bridge.
    ///
    /// # Examples
    ///
    /// ```
    /// use uhf_reader::ReaderError;
    ///
    /// assert_eq!(ReaderError::read("READ FAILED").code(), "UHF_READER_READ_ERROR");
    /// assert_eq!(ReaderError::NotInitialized.code(), "UHF_READER_NOT_INITIALIZED");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            Self::PowerOn(_) => "UHF_READER_POWER_ON_ERROR",
            Self::Init(_) => "UHF_READER_INIT_ERROR",
            Self::Read(_) => "UHF_READER_READ_ERROR",
            Self::Write(_) => "UHF_READER_WRITE_ERROR",
            Self::Release(_) => "UHF_READER_RELEASE_ERROR",
            Self::Other(_) => "UHF_READER_OTHER_ERROR",
            Self::NotInitialized => "UHF_READER_NOT_INITIALIZED",
            Self::InventoryActive => "UHF_READER_INVENTORY_ACTIVE",
            Self::Config(_) => "UHF_READER_CONFIG_ERROR",
        }
    }
}

impl From<DeviceError> for ReaderError {
    fn from(err: DeviceError) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ReaderError::power_on("busy"), "UHF_READER_POWER_ON_ERROR")]
    #[case(ReaderError::init("handshake"), "UHF_READER_INIT_ERROR")]
    #[case(ReaderError::read("READ FAILED"), "UHF_READER_READ_ERROR")]
    #[case(ReaderError::write("Invalid Data"), "UHF_READER_WRITE_ERROR")]
    #[case(ReaderError::release("uart"), "UHF_READER_RELEASE_ERROR")]
    #[case(ReaderError::other("INVALID POWER VALUE"), "UHF_READER_OTHER_ERROR")]
    #[case(ReaderError::NotInitialized, "UHF_READER_NOT_INITIALIZED")]
    #[case(ReaderError::InventoryActive, "UHF_READER_INVENTORY_ACTIVE")]
    #[case(ReaderError::config("event_capacity"), "UHF_READER_CONFIG_ERROR")]
    fn test_error_codes(#[case] error: ReaderError, #[case] code: &str) {
        assert_eq!(error.code(), code);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ReaderError::write("Can't Write Data").to_string(),
            "Write failed: Can't Write Data"
        );
        assert_eq!(ReaderError::NotInitialized.to_string(), "Reader not initialized");
    }

    #[test]
    fn test_device_error_falls_back_to_other() {
        let err: ReaderError = DeviceError::communication("link lost").into();
        assert!(matches!(err, ReaderError::Other(_)));
        assert_eq!(err.to_string(), "Communication error: link lost");
    }
}
