use crate::{DeviceMutation, DeviceRecord, Result};

/// Durable keyed collection of device records.
///
/// `commit` applies one polling cycle's batch as a single unit of work, so
/// concurrent readers never observe a half-applied cycle. `set_nickname` and
/// `remove` are the out-of-band CRUD operations: last writer wins on the
/// nickname, and a removed device reappears as a fresh insert if a later scan
/// sights it again.
pub trait RegistryStore: Send + Sync {
    /// Consistent snapshot of every record, ordered by id.
    fn load_all(&self) -> Result<Vec<DeviceRecord>>;

    fn find_by_uuid(&self, radio_uuid: &str) -> Result<Option<DeviceRecord>>;

    /// Apply one cycle's mutations atomically.
    fn commit(&self, batch: &[DeviceMutation]) -> Result<()>;

    /// Returns false if no record has this uuid.
    fn set_nickname(&self, radio_uuid: &str, nickname: &str) -> Result<bool>;

    /// Returns false if no record has this uuid.
    fn remove(&self, radio_uuid: &str) -> Result<bool>;
}
