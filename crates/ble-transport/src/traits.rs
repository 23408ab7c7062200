use crate::{AdapterInfo, DeviceHandle, DiscoveredDevice, RadioError, Result};
use async_trait::async_trait;
use uuid::Uuid;

/// A minimal BLE central interface.
#[async_trait]
pub trait RadioLink: Send + Sync {
    /// Discover nearby devices. One call is one scan window.
    async fn scan(&self) -> Result<Vec<DiscoveredDevice>>;

    /// Open a GATT session against a device discovered in the current cycle.
    async fn connect(&self, handle: &DeviceHandle) -> Result<Box<dyn GattSession>>;

    /// Attempt to list available adapters for this backend.
    fn adapters(&self) -> Result<Vec<AdapterInfo>> {
        Err(RadioError::Unsupported("adapter enumeration"))
    }
}

/// An open connection to one device. Callers must call `disconnect` on every
/// exit path; a session dropped without it leaks the peripheral connection
/// until the radio stack's own timeout reclaims it.
#[async_trait]
pub trait GattSession: Send + Sync {
    /// UUIDs of the primary services the device exposes.
    async fn services(&self) -> Result<Vec<Uuid>>;

    /// UUIDs of the characteristics within one service.
    async fn characteristics(&self, service: Uuid) -> Result<Vec<Uuid>>;

    /// Read the raw value of one characteristic.
    async fn read(&self, service: Uuid, characteristic: Uuid) -> Result<Vec<u8>>;

    /// Release the connection.
    async fn disconnect(&mut self);
}
