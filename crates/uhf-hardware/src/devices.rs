//! Enum wrapper for UHF device dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn UhfDevice>` is
//! off the table. [`AnyUhfDevice`] gives the reader core one concrete type to
//! own and spawn tasks over, while each variant keeps its own implementation.
//!
//! # Examples
//!
//! ```
//! use uhf_hardware::devices::AnyUhfDevice;
//! use uhf_hardware::mock::MockUhfReader;
//!
//! let (reader, _handle) = MockUhfReader::new();
//! let device = AnyUhfDevice::Mock(reader);
//! ```

use crate::mock::MockUhfReader;
use crate::traits::{TagRecord, UhfDevice};
use crate::types::{AccessPassword, DeviceInfo, MemoryBank, ReadMode};
use crate::Result;

/// Enum wrapper for UHF reader dispatch.
///
/// # Examples
///
/// ```
/// use uhf_hardware::devices::AnyUhfDevice;
/// use uhf_hardware::traits::UhfDevice;
/// use uhf_hardware::mock::MockUhfReader;
///
/// #[tokio::main]
/// async fn main() -> uhf_hardware::Result<()> {
///     let (reader, _handle) = MockUhfReader::new();
///     let device = AnyUhfDevice::Mock(reader);
///
///     let info = device.get_info().await?;
///     println!("Reader: {}", info.name);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyUhfDevice {
    /// Mock reader for development and testing.
    Mock(MockUhfReader),
}

impl From<MockUhfReader> for AnyUhfDevice {
    fn from(reader: MockUhfReader) -> Self {
        Self::Mock(reader)
    }
}

impl UhfDevice for AnyUhfDevice {
    async fn acquire(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.acquire().await,
        }
    }

    async fn release(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.release().await,
        }
    }

    async fn init(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.init().await,
        }
    }

    async fn configure_mode(&mut self, mode: ReadMode) -> Result<()> {
        match self {
            Self::Mock(device) => device.configure_mode(mode).await,
        }
    }

    async fn get_power(&mut self) -> Result<i32> {
        match self {
            Self::Mock(device) => device.get_power().await,
        }
    }

    async fn set_power(&mut self, level: i32) -> Result<bool> {
        match self {
            Self::Mock(device) => device.set_power(level).await,
        }
    }

    async fn start_continuous_read(&mut self) -> Result<bool> {
        match self {
            Self::Mock(device) => device.start_continuous_read().await,
        }
    }

    async fn stop_continuous_read(&mut self) -> Result<bool> {
        match self {
            Self::Mock(device) => device.stop_continuous_read().await,
        }
    }

    async fn poll_buffer(&mut self) -> Result<Option<TagRecord>> {
        match self {
            Self::Mock(device) => device.poll_buffer().await,
        }
    }

    async fn read_one_tag(&mut self) -> Result<Option<TagRecord>> {
        match self {
            Self::Mock(device) => device.read_one_tag().await,
        }
    }

    async fn write_memory(
        &mut self,
        password: AccessPassword,
        bank: MemoryBank,
        offset: u16,
        word_count: u16,
        data: &str,
    ) -> Result<bool> {
        match self {
            Self::Mock(device) => {
                device
                    .write_memory(password, bank, offset, word_count, data)
                    .await
            }
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}
