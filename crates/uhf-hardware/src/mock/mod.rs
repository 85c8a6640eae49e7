//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring physical hardware.

pub mod reader;

pub use reader::{MOCK_POWER_RANGE, MockUhfHandle, MockUhfReader, WriteRecord};
