//! SQLite-backed registry store.
//!
//! Single-file database with the schema created on open. All access goes
//! through one connection behind a mutex, so the poll task and CRUD callers
//! serialize at this boundary and each cycle's batch lands in one transaction.

use crate::{DeviceMutation, DeviceRecord, RegistryStore, Result, StoreError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS devices (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    radio_uuid   TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    nickname     TEXT NOT NULL,
    last_seen    TEXT NOT NULL,
    last_reading INTEGER
);
";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(|e| StoreError::Open(e.to_string()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Open(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::Open(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Query("registry lock poisoned".to_string()))
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<DeviceRecord> {
        Ok(DeviceRecord {
            id: row.get(0)?,
            radio_uuid: row.get(1)?,
            display_name: row.get(2)?,
            nickname: row.get(3)?,
            last_seen: row.get(4)?,
            last_reading: row.get(5)?,
        })
    }
}

const SELECT_COLUMNS: &str = "id, radio_uuid, display_name, nickname, last_seen, last_reading";

impl RegistryStore for SqliteStore {
    fn load_all(&self) -> Result<Vec<DeviceRecord>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {SELECT_COLUMNS} FROM devices ORDER BY id"))?;
        let rows = stmt.query_map([], Self::row_to_record)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn find_by_uuid(&self, radio_uuid: &str) -> Result<Option<DeviceRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM devices WHERE radio_uuid = ?1"),
                params![radio_uuid],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn commit(&self, batch: &[DeviceMutation]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Commit(e.to_string()))?;
        for mutation in batch {
            let applied = match mutation {
                DeviceMutation::Insert {
                    radio_uuid,
                    display_name,
                    nickname,
                    last_seen,
                    last_reading,
                } => tx.execute(
                    // An insert that races an overlapping writer on the same
                    // uuid degrades to an update instead of violating the
                    // unique key.
                    "INSERT INTO devices (radio_uuid, display_name, nickname, last_seen, last_reading)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(radio_uuid) DO UPDATE SET
                         display_name = excluded.display_name,
                         last_seen = excluded.last_seen,
                         last_reading = COALESCE(excluded.last_reading, devices.last_reading)",
                    params![radio_uuid, display_name, nickname, last_seen, last_reading],
                ),
                DeviceMutation::Update {
                    id,
                    display_name,
                    last_seen,
                    last_reading,
                } => tx.execute(
                    "UPDATE devices SET
                         display_name = ?2,
                         last_seen = ?3,
                         last_reading = COALESCE(?4, last_reading)
                     WHERE id = ?1",
                    params![id, display_name, last_seen, last_reading],
                ),
            };
            applied.map_err(|e| StoreError::Commit(e.to_string()))?;
        }
        tx.commit().map_err(|e| StoreError::Commit(e.to_string()))?;
        debug!(mutations = batch.len(), "registry commit");
        Ok(())
    }

    fn set_nickname(&self, radio_uuid: &str, nickname: &str) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE devices SET nickname = ?2 WHERE radio_uuid = ?1",
            params![radio_uuid, nickname],
        )?;
        Ok(changed > 0)
    }

    fn remove(&self, radio_uuid: &str) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "DELETE FROM devices WHERE radio_uuid = ?1",
            params![radio_uuid],
        )?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn insert(uuid: &str, name: &str, reading: Option<i32>) -> DeviceMutation {
        DeviceMutation::Insert {
            radio_uuid: uuid.to_string(),
            display_name: name.to_string(),
            nickname: "Pakkun Flower".to_string(),
            last_seen: datetime!(2026-08-06 12:00:00 UTC),
            last_reading: reading,
        }
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .commit(&[
                insert("a1", "SoilSensor-A1", Some(42)),
                insert("b2", "SoilSensor-B2", None),
            ])
            .unwrap();

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].id < records[1].id);
        assert_eq!(records[0].radio_uuid, "a1");
        assert_eq!(records[0].last_reading, Some(42));
        assert_eq!(records[1].last_reading, None);
    }

    #[test]
    fn test_update_keeps_reading_when_absent() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.commit(&[insert("a1", "SoilSensor-A1", Some(42))]).unwrap();
        let id = store.find_by_uuid("a1").unwrap().unwrap().id;

        let later = datetime!(2026-08-06 12:00:10 UTC);
        store
            .commit(&[DeviceMutation::Update {
                id,
                display_name: "SoilSensor-A1".to_string(),
                last_seen: later,
                last_reading: None,
            }])
            .unwrap();

        let record = store.find_by_uuid("a1").unwrap().unwrap();
        assert_eq!(record.last_reading, Some(42));
        assert_eq!(record.last_seen, later);
    }

    #[test]
    fn test_update_replaces_reading_when_present() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.commit(&[insert("a1", "SoilSensor-A1", Some(42))]).unwrap();
        let id = store.find_by_uuid("a1").unwrap().unwrap().id;

        store
            .commit(&[DeviceMutation::Update {
                id,
                display_name: "SoilSensor-A1".to_string(),
                last_seen: datetime!(2026-08-06 12:00:10 UTC),
                last_reading: Some(17),
            }])
            .unwrap();

        assert_eq!(
            store.find_by_uuid("a1").unwrap().unwrap().last_reading,
            Some(17)
        );
    }

    #[test]
    fn test_insert_conflict_degrades_to_update() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.commit(&[insert("a1", "SoilSensor-A1", Some(42))]).unwrap();
        store.set_nickname("a1", "Fern").unwrap();

        store.commit(&[insert("a1", "SoilSensor-A1b", None)]).unwrap();

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 1);
        // reading survives, display name refreshes, user nickname wins
        assert_eq!(records[0].last_reading, Some(42));
        assert_eq!(records[0].display_name, "SoilSensor-A1b");
        assert_eq!(records[0].nickname, "Fern");
    }

    #[test]
    fn test_update_after_removal_is_a_no_op() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.commit(&[insert("a1", "SoilSensor-A1", Some(42))]).unwrap();
        let id = store.find_by_uuid("a1").unwrap().unwrap().id;

        // removal lands while a cycle holding this id is still in flight
        assert!(store.remove("a1").unwrap());
        store
            .commit(&[DeviceMutation::Update {
                id,
                display_name: "SoilSensor-A1".to_string(),
                last_seen: datetime!(2026-08-06 12:00:10 UTC),
                last_reading: Some(17),
            }])
            .unwrap();
        assert!(store.load_all().unwrap().is_empty());

        // the device comes back as a fresh insert on the next cycle
        store.commit(&[insert("a1", "SoilSensor-A1", Some(17))]).unwrap();
        let record = store.find_by_uuid("a1").unwrap().unwrap();
        assert!(record.id > id);
        assert_eq!(record.nickname, "Pakkun Flower");
    }

    #[test]
    fn test_nickname_and_remove() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.commit(&[insert("a1", "SoilSensor-A1", None)]).unwrap();

        assert!(store.set_nickname("a1", "Basil").unwrap());
        assert!(!store.set_nickname("nope", "Basil").unwrap());
        assert_eq!(store.find_by_uuid("a1").unwrap().unwrap().nickname, "Basil");

        assert!(store.remove("a1").unwrap());
        assert!(!store.remove("a1").unwrap());
        assert!(store.load_all().unwrap().is_empty());
    }
}
