//! Device abstraction layer for UHF RFID readers.
//!
//! This crate defines the contract between the reader core and a vendor SDK:
//! the [`UhfDevice`] trait, the [`TagRecord`] it produces, and the small value
//! types that cross the boundary. A programmable mock reader lives in
//! [`mock`] so the core can be developed and tested without hardware.
//!
//! # Design Philosophy
//!
//! - **Async-first**: every SDK call is an `async fn` (Edition 2024 RPITIT).
//! - **Enum dispatch**: the traits are not object-safe, so owners hold an
//!   [`AnyUhfDevice`] instead of a `Box<dyn UhfDevice>`.
//! - **Thread-safe**: devices are `Send + Sync` for use with Tokio.
//! - **Honest answers**: the SDK's accept/refuse answers are `bool`s; `Err` is
//!   reserved for the call itself failing.
//!
//! # Example
//!
//! ```no_run
//! use uhf_hardware::traits::UhfDevice;
//! use uhf_hardware::error::Result;
//!
//! async fn drain<D: UhfDevice>(reader: &mut D) -> Result<Vec<String>> {
//!     let mut epcs = Vec::new();
//!     while let Some(tag) = reader.poll_buffer().await? {
//!         epcs.push(tag.epc);
//!     }
//!     Ok(epcs)
//! }
//! ```
//!
//! [`UhfDevice`]: traits::UhfDevice
//! [`TagRecord`]: traits::TagRecord
//! [`AnyUhfDevice`]: devices::AnyUhfDevice

pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use devices::AnyUhfDevice;
pub use error::{DeviceError, Result};
pub use traits::{TagRecord, UhfDevice};
pub use types::{AccessPassword, DeviceInfo, MemoryBank, ReadMode};
