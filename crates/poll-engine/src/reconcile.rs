//! Merge one scan cycle's results against the registry snapshot.

use ble_transport::DiscoveredDevice;
use plant_registry::{DeviceMutation, DeviceRecord};
use std::collections::{HashMap, HashSet};
use time::OffsetDateTime;

/// Decide insert vs. update for every device sighted this cycle.
///
/// Records absent from the scan produce no mutation at all. A failed read
/// arrives as `None` and maps to `last_reading: None` in the mutation, which
/// the stores treat as "keep the stored value". Matching is exact string
/// equality on `radio_uuid`.
pub fn reconcile(
    snapshot: &[DeviceRecord],
    sightings: &[(DiscoveredDevice, Option<i32>)],
    now: OffsetDateTime,
    default_nickname: &str,
) -> Vec<DeviceMutation> {
    let by_uuid: HashMap<&str, &DeviceRecord> = snapshot
        .iter()
        .map(|record| (record.radio_uuid.as_str(), record))
        .collect();

    let mut seen = HashSet::new();
    let mut batch = Vec::with_capacity(sightings.len());
    for (device, reading) in sightings {
        // A uuid may appear twice in one scan window; the first sighting wins
        // so the batch never carries two mutations for one record.
        if !seen.insert(device.radio_uuid.as_str()) {
            continue;
        }
        match by_uuid.get(device.radio_uuid.as_str()) {
            Some(existing) => batch.push(DeviceMutation::Update {
                id: existing.id,
                display_name: device.advertised_name.clone(),
                last_seen: now,
                last_reading: *reading,
            }),
            None => batch.push(DeviceMutation::Insert {
                radio_uuid: device.radio_uuid.clone(),
                display_name: device.advertised_name.clone(),
                nickname: default_nickname.to_string(),
                last_seen: now,
                last_reading: *reading,
            }),
        }
    }
    batch
}
