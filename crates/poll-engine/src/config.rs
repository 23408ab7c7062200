use std::time::Duration;
use uuid::{uuid, Uuid};

/// GATT service that carries the moisture characteristic.
pub const MOISTURE_SERVICE: Uuid = uuid!("12345678-1234-1234-1234-123456789abc");

/// GATT characteristic holding the moisture value.
pub const MOISTURE_CHARACTERISTIC: Uuid = uuid!("abcd1234-5678-1234-5678-abcdef123456");

/// Engine configuration. Fixed at process start; there is no hot reload.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between the end of one cycle and the start of the next.
    pub interval: Duration,
    pub service_uuid: Uuid,
    pub characteristic_uuid: Uuid,
    /// Label given to a device on first insert. User edits win afterwards.
    pub default_nickname: String,
    /// Case-insensitive substring filter on the advertised name. `None`
    /// tracks every device the scan returns.
    pub name_filter: Option<String>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            service_uuid: MOISTURE_SERVICE,
            characteristic_uuid: MOISTURE_CHARACTERISTIC,
            default_nickname: "Pakkun Flower".to_string(),
            name_filter: Some("SoilSensor".to_string()),
        }
    }
}
