//! Reader core for UHF RFID handhelds.
//!
//! This crate sits between a host application and a vendor SDK (reached
//! through [`uhf_hardware::UhfDevice`]). It provides:
//!
//! - [`handle::ReaderHandle`]: power lifecycle and guarded hardware calls
//! - [`inventory::InventoryEngine`]: the continuous inventory polling loop
//! - [`sink::ResultSink`]: event delivery to the host
//! - [`service::UhfReaderService`]: the host command surface
//!
//! # Example
//!
//! ```no_run
//! use uhf_hardware::mock::MockUhfReader;
//! use uhf_reader::{ReaderConfig, UhfReaderService};
//!
//! # async fn example() -> uhf_reader::Result<()> {
//! let (device, _mock) = MockUhfReader::new();
//! let (service, mut events) = UhfReaderService::with_channel(device, ReaderConfig::default())?;
//!
//! service.initialize_reader();
//! service.start_reading_tags().await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{}: {:?}", event.name(), event);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod epc;
pub mod error;
pub mod handle;
pub mod inventory;
pub mod service;
pub mod sink;

pub use config::{OverlapPolicy, ReaderConfig, WriteConfig};
pub use error::{ReaderError, Result};
pub use handle::{ReaderHandle, ReaderState, SharedReader};
pub use inventory::{InventoryEngine, ScanMode};
pub use service::UhfReaderService;
pub use sink::{ChannelSink, EventStream, ReaderEvent, ResultSink};
