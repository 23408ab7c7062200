//! ble-transport: cross-platform BLE radio abstractions
//!
//! This crate provides traits and types for discovering low-power sensor
//! devices and reading GATT characteristics, with feature-gated backends. The
//! default build enables a `mock` backend so that binaries can compile on any
//! host without a native radio stack.

mod types;
pub use types::{AdapterInfo, DeviceHandle, DiscoveredDevice};

mod error;
pub use error::{RadioError, Result};

mod traits;
pub use traits::{GattSession, RadioLink};

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::MockRadio;
