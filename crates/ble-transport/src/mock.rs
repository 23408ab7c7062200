use crate::{AdapterInfo, DeviceHandle, DiscoveredDevice, GattSession, RadioError, RadioLink, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// A simple in-process mock radio. Each instance owns an independent set of
/// simulated peripherals, programmed through the methods below.
#[derive(Clone, Debug)]
struct MockPeripheral {
    radio_uuid: String,
    advertised_name: String,
    service: Uuid,
    characteristic: Uuid,
    payload: Vec<u8>,
    fail_connect: bool,
}

#[derive(Default)]
struct MockState {
    // BTreeMap keyed by radio_uuid keeps scan order deterministic
    peripherals: BTreeMap<String, MockPeripheral>,
    fail_next_scan: bool,
    scans: u64,
}

#[derive(Clone, Default)]
pub struct MockRadio {
    state: Arc<Mutex<MockState>>,
}

impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a peripheral that answers reads on the given service/characteristic
    /// pair with `value` encoded as a little-endian i32.
    pub fn add_sensor(
        &self,
        radio_uuid: &str,
        name: &str,
        service: Uuid,
        characteristic: Uuid,
        value: i32,
    ) {
        self.add_raw(
            radio_uuid,
            name,
            service,
            characteristic,
            value.to_le_bytes().to_vec(),
        );
    }

    /// Add a peripheral with an arbitrary raw payload.
    pub fn add_raw(
        &self,
        radio_uuid: &str,
        name: &str,
        service: Uuid,
        characteristic: Uuid,
        payload: Vec<u8>,
    ) {
        if let Ok(mut state) = self.state.lock() {
            state.peripherals.insert(
                radio_uuid.to_string(),
                MockPeripheral {
                    radio_uuid: radio_uuid.to_string(),
                    advertised_name: name.to_string(),
                    service,
                    characteristic,
                    payload,
                    fail_connect: false,
                },
            );
        }
    }

    /// Replace the value a peripheral reports.
    pub fn set_reading(&self, radio_uuid: &str, value: i32) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(p) = state.peripherals.get_mut(radio_uuid) {
                p.payload = value.to_le_bytes().to_vec();
            }
        }
    }

    /// Make connection attempts against a peripheral fail.
    pub fn set_fail_connect(&self, radio_uuid: &str, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(p) = state.peripherals.get_mut(radio_uuid) {
                p.fail_connect = fail;
            }
        }
    }

    /// Remove a peripheral from the simulated neighborhood.
    pub fn remove(&self, radio_uuid: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.peripherals.remove(radio_uuid);
        }
    }

    /// Make the next scan fail once.
    pub fn fail_next_scan(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_next_scan = true;
        }
    }

    /// Number of scans performed so far.
    pub fn scan_count(&self) -> u64 {
        self.state.lock().map(|s| s.scans).unwrap_or(0)
    }
}

#[async_trait]
impl RadioLink for MockRadio {
    async fn scan(&self) -> Result<Vec<DiscoveredDevice>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| RadioError::AdapterUnavailable("mock state poisoned".to_string()))?;
        state.scans += 1;
        if state.fail_next_scan {
            state.fail_next_scan = false;
            return Err(RadioError::ScanFailed("injected scan fault".to_string()));
        }
        let hits: Vec<DiscoveredDevice> = state
            .peripherals
            .values()
            .map(|p| DiscoveredDevice {
                handle: DeviceHandle::new(&p.radio_uuid),
                radio_uuid: p.radio_uuid.clone(),
                advertised_name: p.advertised_name.clone(),
            })
            .collect();
        debug!(hits = hits.len(), "mock scan");
        Ok(hits)
    }

    async fn connect(&self, handle: &DeviceHandle) -> Result<Box<dyn GattSession>> {
        let state = self
            .state
            .lock()
            .map_err(|_| RadioError::AdapterUnavailable("mock state poisoned".to_string()))?;
        let peripheral = state
            .peripherals
            .get(handle.as_str())
            .ok_or_else(|| RadioError::ConnectFailed(format!("{handle} out of range")))?;
        if peripheral.fail_connect {
            return Err(RadioError::ConnectFailed(format!("{handle} refused")));
        }
        Ok(Box::new(MockSession {
            peripheral: peripheral.clone(),
            connected: true,
        }))
    }

    fn adapters(&self) -> Result<Vec<AdapterInfo>> {
        Ok(vec![AdapterInfo {
            name: "mock0".to_string(),
            driver: "mock".to_string(),
        }])
    }
}

struct MockSession {
    peripheral: MockPeripheral,
    connected: bool,
}

#[async_trait]
impl GattSession for MockSession {
    async fn services(&self) -> Result<Vec<Uuid>> {
        if !self.connected {
            return Err(RadioError::ReadFailed("not connected".to_string()));
        }
        Ok(vec![self.peripheral.service])
    }

    async fn characteristics(&self, service: Uuid) -> Result<Vec<Uuid>> {
        if !self.connected {
            return Err(RadioError::ReadFailed("not connected".to_string()));
        }
        if service == self.peripheral.service {
            Ok(vec![self.peripheral.characteristic])
        } else {
            Ok(Vec::new())
        }
    }

    async fn read(&self, service: Uuid, characteristic: Uuid) -> Result<Vec<u8>> {
        if !self.connected {
            return Err(RadioError::ReadFailed("not connected".to_string()));
        }
        if service == self.peripheral.service && characteristic == self.peripheral.characteristic {
            Ok(self.peripheral.payload.clone())
        } else {
            Err(RadioError::ReadFailed(format!(
                "no value at {service}/{characteristic}"
            )))
        }
    }

    async fn disconnect(&mut self) {
        self.connected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::uuid;

    const SVC: Uuid = uuid!("12345678-1234-1234-1234-123456789abc");
    const CHR: Uuid = uuid!("abcd1234-5678-1234-5678-abcdef123456");

    #[tokio::test]
    async fn test_scan_returns_programmed_devices() {
        let radio = MockRadio::new();
        radio.add_sensor("b2", "SoilSensor-B2", SVC, CHR, 17);
        radio.add_sensor("a1", "SoilSensor-A1", SVC, CHR, 42);

        let hits = radio.scan().await.unwrap();
        assert_eq!(hits.len(), 2);
        // deterministic ordering by uuid
        assert_eq!(hits[0].radio_uuid, "a1");
        assert_eq!(hits[1].radio_uuid, "b2");
        assert_eq!(radio.scan_count(), 1);
    }

    #[tokio::test]
    async fn test_connect_read_round_trip() {
        let radio = MockRadio::new();
        radio.add_sensor("a1", "SoilSensor-A1", SVC, CHR, 42);

        let hits = radio.scan().await.unwrap();
        let mut session = radio.connect(&hits[0].handle).await.unwrap();
        let raw = session.read(SVC, CHR).await.unwrap();
        assert_eq!(i32::from_le_bytes(raw[..4].try_into().unwrap()), 42);

        session.disconnect().await;
        assert!(session.read(SVC, CHR).await.is_err());
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let radio = MockRadio::new();
        radio.add_sensor("a1", "SoilSensor-A1", SVC, CHR, 42);

        radio.fail_next_scan();
        assert!(matches!(
            radio.scan().await,
            Err(RadioError::ScanFailed(_))
        ));
        // fault is one-shot
        assert_eq!(radio.scan().await.unwrap().len(), 1);

        radio.set_fail_connect("a1", true);
        let hits = radio.scan().await.unwrap();
        assert!(matches!(
            radio.connect(&hits[0].handle).await,
            Err(RadioError::ConnectFailed(_))
        ));
    }
}
