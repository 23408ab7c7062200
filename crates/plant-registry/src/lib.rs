//! plant-registry: durable registry of soil-moisture sensor devices
//!
//! Records are keyed by the radio-assigned device uuid. The polling engine
//! mutates records only through [`DeviceMutation`] batches committed as one
//! unit of work per cycle; nickname edits and removals arrive out-of-band and
//! may run concurrently with a cycle.

mod types;
pub use types::{DeviceMutation, DeviceRecord};

mod error;
pub use error::{Result, StoreError};

mod store;
pub use store::RegistryStore;

mod sqlite;
pub use sqlite::SqliteStore;

mod memory;
pub use memory::MemoryStore;
