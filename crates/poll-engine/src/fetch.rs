//! Single connect/read/disconnect sequence against one discovered device.

use crate::ReadError;
use ble_transport::{DiscoveredDevice, GattSession, RadioLink};
use tracing::debug;
use uuid::Uuid;

/// Reads one moisture value from one device. Failures are classified and
/// returned as values; the session is released on every exit path.
#[derive(Debug, Clone)]
pub struct TelemetryFetcher {
    service_uuid: Uuid,
    characteristic_uuid: Uuid,
}

impl TelemetryFetcher {
    pub fn new(service_uuid: Uuid, characteristic_uuid: Uuid) -> Self {
        Self {
            service_uuid,
            characteristic_uuid,
        }
    }

    pub async fn read_moisture(
        &self,
        radio: &dyn RadioLink,
        device: &DiscoveredDevice,
    ) -> Result<i32, ReadError> {
        let mut session = radio
            .connect(&device.handle)
            .await
            .map_err(|e| ReadError::ConnectionFailed(e.to_string()))?;
        let value = self.read_from_session(session.as_ref()).await;
        session.disconnect().await;
        if let Ok(moisture) = value {
            debug!(device = %device.advertised_name, moisture, "moisture read");
        }
        value
    }

    async fn read_from_session(&self, session: &dyn GattSession) -> Result<i32, ReadError> {
        let services = session
            .services()
            .await
            .map_err(|e| ReadError::ConnectionFailed(e.to_string()))?;
        if !services.contains(&self.service_uuid) {
            return Err(ReadError::ServiceNotFound);
        }
        let characteristics = session
            .characteristics(self.service_uuid)
            .await
            .map_err(|e| ReadError::ConnectionFailed(e.to_string()))?;
        if !characteristics.contains(&self.characteristic_uuid) {
            return Err(ReadError::CharacteristicNotFound);
        }
        let raw = session
            .read(self.service_uuid, self.characteristic_uuid)
            .await
            .map_err(|e| ReadError::ConnectionFailed(e.to_string()))?;
        decode_moisture(&raw)
    }
}

/// The sensor reports moisture as a little-endian i32 in the first four bytes
/// of the characteristic value.
fn decode_moisture(raw: &[u8]) -> Result<i32, ReadError> {
    let bytes: [u8; 4] = raw
        .get(..4)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(ReadError::DecodeFailed("payload shorter than four bytes"))?;
    Ok(i32::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MOISTURE_CHARACTERISTIC, MOISTURE_SERVICE};
    use ble_transport::MockRadio;
    use uuid::uuid;

    fn fetcher() -> TelemetryFetcher {
        TelemetryFetcher::new(MOISTURE_SERVICE, MOISTURE_CHARACTERISTIC)
    }

    async fn only_device(radio: &MockRadio) -> DiscoveredDevice {
        radio.scan().await.unwrap().remove(0)
    }

    #[tokio::test]
    async fn test_read_succeeds() {
        let radio = MockRadio::new();
        radio.add_sensor("a1", "SoilSensor-A1", MOISTURE_SERVICE, MOISTURE_CHARACTERISTIC, 42);

        let device = only_device(&radio).await;
        assert_eq!(fetcher().read_moisture(&radio, &device).await, Ok(42));
    }

    #[tokio::test]
    async fn test_connect_failure_is_classified() {
        let radio = MockRadio::new();
        radio.add_sensor("a1", "SoilSensor-A1", MOISTURE_SERVICE, MOISTURE_CHARACTERISTIC, 42);
        radio.set_fail_connect("a1", true);

        let device = only_device(&radio).await;
        assert!(matches!(
            fetcher().read_moisture(&radio, &device).await,
            Err(ReadError::ConnectionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_service_is_classified() {
        let radio = MockRadio::new();
        radio.add_sensor(
            "a1",
            "SoilSensor-A1",
            uuid!("00000000-0000-0000-0000-00000000beef"),
            MOISTURE_CHARACTERISTIC,
            42,
        );

        let device = only_device(&radio).await;
        assert_eq!(
            fetcher().read_moisture(&radio, &device).await,
            Err(ReadError::ServiceNotFound)
        );
    }

    #[tokio::test]
    async fn test_missing_characteristic_is_classified() {
        let radio = MockRadio::new();
        radio.add_sensor(
            "a1",
            "SoilSensor-A1",
            MOISTURE_SERVICE,
            uuid!("00000000-0000-0000-0000-00000000beef"),
            42,
        );

        let device = only_device(&radio).await;
        assert_eq!(
            fetcher().read_moisture(&radio, &device).await,
            Err(ReadError::CharacteristicNotFound)
        );
    }

    #[tokio::test]
    async fn test_short_payload_fails_decode() {
        let radio = MockRadio::new();
        radio.add_raw(
            "a1",
            "SoilSensor-A1",
            MOISTURE_SERVICE,
            MOISTURE_CHARACTERISTIC,
            vec![0x2a, 0x00],
        );

        let device = only_device(&radio).await;
        assert!(matches!(
            fetcher().read_moisture(&radio, &device).await,
            Err(ReadError::DecodeFailed(_))
        ));
    }

    #[test]
    fn test_decode_takes_first_four_bytes_little_endian() {
        assert_eq!(decode_moisture(&42i32.to_le_bytes()), Ok(42));
        assert_eq!(decode_moisture(&[0x2a, 0x00, 0x00, 0x00, 0xff]), Ok(42));
        assert!(decode_moisture(&[]).is_err());
    }
}
