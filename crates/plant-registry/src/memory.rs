//! In-memory registry store for tests and mock runs. Same contract as the
//! SQLite store, including insert-conflict degradation.

use crate::{DeviceMutation, DeviceRecord, RegistryStore, Result, StoreError};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryInner {
    // keyed by id so load_all comes back in insert order
    records: BTreeMap<i64, DeviceRecord>,
    next_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Query("registry lock poisoned".to_string()))
    }
}

impl RegistryStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<DeviceRecord>> {
        let inner = self.lock()?;
        Ok(inner.records.values().cloned().collect())
    }

    fn find_by_uuid(&self, radio_uuid: &str) -> Result<Option<DeviceRecord>> {
        let inner = self.lock()?;
        Ok(inner
            .records
            .values()
            .find(|r| r.radio_uuid == radio_uuid)
            .cloned())
    }

    fn commit(&self, batch: &[DeviceMutation]) -> Result<()> {
        // One lock for the whole batch; readers see all of it or none of it.
        let mut inner = self.lock()?;
        for mutation in batch {
            match mutation {
                DeviceMutation::Insert {
                    radio_uuid,
                    display_name,
                    nickname,
                    last_seen,
                    last_reading,
                } => {
                    let existing = inner
                        .records
                        .values()
                        .find(|r| &r.radio_uuid == radio_uuid)
                        .map(|r| r.id);
                    match existing {
                        Some(id) => {
                            if let Some(record) = inner.records.get_mut(&id) {
                                record.display_name = display_name.clone();
                                record.last_seen = *last_seen;
                                if last_reading.is_some() {
                                    record.last_reading = *last_reading;
                                }
                            }
                        }
                        None => {
                            inner.next_id += 1;
                            let id = inner.next_id;
                            inner.records.insert(
                                id,
                                DeviceRecord {
                                    id,
                                    radio_uuid: radio_uuid.clone(),
                                    display_name: display_name.clone(),
                                    nickname: nickname.clone(),
                                    last_seen: *last_seen,
                                    last_reading: *last_reading,
                                },
                            );
                        }
                    }
                }
                DeviceMutation::Update {
                    id,
                    display_name,
                    last_seen,
                    last_reading,
                } => {
                    if let Some(record) = inner.records.get_mut(id) {
                        record.display_name = display_name.clone();
                        record.last_seen = *last_seen;
                        if last_reading.is_some() {
                            record.last_reading = *last_reading;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn set_nickname(&self, radio_uuid: &str, nickname: &str) -> Result<bool> {
        let mut inner = self.lock()?;
        match inner
            .records
            .values_mut()
            .find(|r| r.radio_uuid == radio_uuid)
        {
            Some(record) => {
                record.nickname = nickname.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&self, radio_uuid: &str) -> Result<bool> {
        let mut inner = self.lock()?;
        let id = inner
            .records
            .values()
            .find(|r| r.radio_uuid == radio_uuid)
            .map(|r| r.id);
        match id {
            Some(id) => {
                inner.records.remove(&id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_memory_store_matches_sqlite_contract() {
        let store = MemoryStore::new();
        store
            .commit(&[DeviceMutation::Insert {
                radio_uuid: "a1".to_string(),
                display_name: "SoilSensor-A1".to_string(),
                nickname: "Pakkun Flower".to_string(),
                last_seen: datetime!(2026-08-06 12:00:00 UTC),
                last_reading: Some(42),
            }])
            .unwrap();

        let record = store.find_by_uuid("a1").unwrap().unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.nickname, "Pakkun Flower");

        store
            .commit(&[DeviceMutation::Update {
                id: record.id,
                display_name: "SoilSensor-A1".to_string(),
                last_seen: datetime!(2026-08-06 12:00:10 UTC),
                last_reading: None,
            }])
            .unwrap();
        assert_eq!(
            store.find_by_uuid("a1").unwrap().unwrap().last_reading,
            Some(42)
        );

        assert!(store.set_nickname("a1", "Basil").unwrap());
        assert!(store.remove("a1").unwrap());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_record_serializes_to_json() {
        let record = DeviceRecord {
            id: 1,
            radio_uuid: "a1".to_string(),
            display_name: "SoilSensor-A1".to_string(),
            nickname: "Pakkun Flower".to_string(),
            last_seen: datetime!(2026-08-06 12:00:00 UTC),
            last_reading: Some(42),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["radio_uuid"], "a1");
        assert_eq!(json["last_reading"], 42);
        assert_eq!(json["last_seen"], "2026-08-06T12:00:00Z");
    }
}
