use core::fmt;

/// Opaque re-addressing token for one discovered device. Valid only within
/// the scan cycle that produced it; the backend may recycle addresses between
/// scans.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DeviceHandle(String);

impl DeviceHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One scan hit. Ephemeral: produced by a scan, consumed within the same
/// cycle, never persisted.
#[derive(Clone, Debug)]
pub struct DiscoveredDevice {
    pub handle: DeviceHandle,
    /// Stable identifier assigned by the radio stack. This is the natural key
    /// used to correlate sightings across cycles.
    pub radio_uuid: String,
    /// Name the device advertised in this scan window. May change between
    /// scans without identity loss.
    pub advertised_name: String,
}

#[derive(Clone, Debug)]
pub struct AdapterInfo {
    pub name: String,
    pub driver: String,
}
