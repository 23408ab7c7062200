use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A tracked sensor device.
///
/// `radio_uuid` is the natural key and unique within the registry. `id` is
/// assigned by the store on first insert and stable for the record's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: i64,
    pub radio_uuid: String,
    /// Name the device advertised at its most recent sighting.
    pub display_name: String,
    /// User-assigned label. Set to a placeholder on first insert; the polling
    /// engine never overwrites it afterwards.
    pub nickname: String,
    /// Most recent scan in which this uuid appeared. Monotonically
    /// non-decreasing.
    #[serde(with = "time::serde::rfc3339")]
    pub last_seen: OffsetDateTime,
    /// Most recent successful moisture read. A failed read leaves the previous
    /// value in place.
    pub last_reading: Option<i32>,
}

/// One reconciliation outcome for one sighted device.
///
/// `Update` deliberately carries no nickname: the engine cannot express an
/// overwrite of a user-assigned label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceMutation {
    Insert {
        radio_uuid: String,
        display_name: String,
        nickname: String,
        last_seen: OffsetDateTime,
        last_reading: Option<i32>,
    },
    /// `last_reading: None` means "keep the stored value", not "clear it".
    Update {
        id: i64,
        display_name: String,
        last_seen: OffsetDateTime,
        last_reading: Option<i32>,
    },
}
