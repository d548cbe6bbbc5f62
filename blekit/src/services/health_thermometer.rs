//! Health Thermometer Service (0x1809)
//!
//! # Temperature Measurement layout
//!
//! ```text
//! ┌─────────┬──────────────────┬──────────────────┬──────────────────┐
//! │  Flags  │   Temperature    │ Timestamp (opt.) │ Temp. type (opt.)│
//! │ 1 byte  │ 4 bytes FLOAT    │ 7 bytes          │ 1 byte           │
//! └─────────┴──────────────────┴──────────────────┴──────────────────┘
//! ```
//!
//! Flags: bit 0 set = Fahrenheit, bit 1 = timestamp present, bit 2 =
//! temperature type present.

use tracing::{debug, trace};

use blekit_core::{DeviceInfo, Error, Result, ServiceHandler, SharedDispatcher};
use blekit_types::service_uuid::same_uuid;
use blekit_types::{Observation, ObservationLocation, ObservationType, ObservationUnit};

use super::{decode_date_time, ensure_len, now};

pub const HEALTH_THERMOMETER_SERVICE_UUID: &str = "00001809-0000-1000-8000-00805f9b34fb";
pub const TEMPERATURE_MEASUREMENT_CHAR_UUID: &str = "00002a1c-0000-1000-8000-00805f9b34fb";
pub const INTERMEDIATE_TEMPERATURE_CHAR_UUID: &str = "00002a1e-0000-1000-8000-00805f9b34fb";

const CHARACTERISTIC: &str = "Temperature Measurement";

const FLAG_FAHRENHEIT: u8 = 0x01;
const FLAG_TIMESTAMP: u8 = 0x02;
const FLAG_TEMPERATURE_TYPE: u8 = 0x04;

// IEEE 11073-20601 FLOAT special mantissas
const MANTISSA_NAN: i32 = 0x007F_FFFF;
const MANTISSA_NRES: i32 = -0x0080_0000;
const MANTISSA_POSITIVE_INFINITY: i32 = 0x007F_FFFE;
const MANTISSA_NEGATIVE_INFINITY: i32 = -0x007F_FFFE;
const MANTISSA_RESERVED: i32 = -0x007F_FFFF;

/// Turns temperature measurements into body temperature observations
#[derive(Default)]
pub struct HealthThermometerServiceHandler {
    observations_callback: Option<SharedDispatcher>,
}

impl HealthThermometerServiceHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one Temperature Measurement value
    pub fn decode_measurement(value: &[u8]) -> Result<Observation> {
        ensure_len(CHARACTERISTIC, value, 5)?;

        let flags = value[0];
        let temperature = decode_float(&value[1..5])?;
        let mut offset = 5;

        let unit = if flags & FLAG_FAHRENHEIT != 0 {
            ObservationUnit::Fahrenheit
        } else {
            ObservationUnit::Celsius
        };

        let received = now();
        let timestamp = if flags & FLAG_TIMESTAMP != 0 {
            ensure_len(CHARACTERISTIC, value, offset + 7)?;
            let timestamp = decode_date_time(CHARACTERISTIC, &value[offset..offset + 7], 0)?;
            offset += 7;
            timestamp
        } else {
            received
        };

        let location = if flags & FLAG_TEMPERATURE_TYPE != 0 {
            ensure_len(CHARACTERISTIC, value, offset + 1)?;
            ObservationLocation::from(value[offset])
        } else {
            ObservationLocation::Unknown
        };

        Ok(
            Observation::new(temperature, unit, ObservationType::BodyTemperature, timestamp)
                .with_received(received)
                .with_location(location),
        )
    }
}

/// Decode a little-endian IEEE 11073 32-bit FLOAT (24-bit mantissa, 8-bit
/// exponent, both signed)
fn decode_float(bytes: &[u8]) -> Result<f32> {
    let raw = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

    // Sign-extend the 24-bit mantissa
    let mantissa = ((raw << 8) as i32) >> 8;
    let exponent = (raw >> 24) as i8;

    match mantissa {
        MANTISSA_NAN | MANTISSA_NRES | MANTISSA_POSITIVE_INFINITY
        | MANTISSA_NEGATIVE_INFINITY | MANTISSA_RESERVED => Err(Error::InvalidValue {
            characteristic: CHARACTERISTIC,
            reason: format!("special FLOAT value 0x{:06X}", raw & 0x00FF_FFFF),
        }),
        _ => Ok((mantissa as f64 * 10f64.powi(exponent.into())) as f32),
    }
}

impl ServiceHandler for HealthThermometerServiceHandler {
    fn uuid(&self) -> &str {
        HEALTH_THERMOMETER_SERVICE_UUID
    }

    fn set_observations_callback(&mut self, dispatcher: SharedDispatcher) {
        self.observations_callback = Some(dispatcher);
    }

    fn on_characteristic_changed(
        &mut self,
        device: &mut DeviceInfo,
        characteristic_uuid: &str,
        value: &[u8],
    ) -> Result<()> {
        if !same_uuid(characteristic_uuid, TEMPERATURE_MEASUREMENT_CHAR_UUID)
            && !same_uuid(characteristic_uuid, INTERMEDIATE_TEMPERATURE_CHAR_UUID)
        {
            trace!("Ignoring thermometer characteristic {}", characteristic_uuid);
            return Ok(());
        }

        let observation = Self::decode_measurement(value)?;

        debug!(
            "{}: temperature {:.1} {}",
            device.address(),
            observation.value,
            observation.unit
        );
        device.set_last_observation_timestamp(&observation.timestamp);

        if let Some(callback) = &self.observations_callback {
            callback.on_observations(&[observation]);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blekit_core::DeviceInfoStore;
    use chrono::{NaiveDate, Timelike};
    use pretty_assertions::assert_eq;

    use crate::services::testing::recording;

    const ADDRESS: &str = "00:11:22:33:44:55";

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_decode_float() {
        // 3684 * 10^-2
        let bytes = [0x64, 0x0E, 0x00, 0xFE];
        assert!(approx(decode_float(&bytes).unwrap(), 36.84));
    }

    #[test]
    fn test_decode_float_negative_mantissa() {
        // -5 * 10^0
        let bytes = [0xFB, 0xFF, 0xFF, 0x00];
        assert!(approx(decode_float(&bytes).unwrap(), -5.0));
    }

    #[test]
    fn test_decode_float_special_values() {
        assert!(decode_float(&[0xFF, 0xFF, 0x7F, 0x00]).is_err());
        assert!(decode_float(&[0x00, 0x00, 0x80, 0x00]).is_err());
        assert!(decode_float(&[0xFE, 0xFF, 0x7F, 0x00]).is_err());
    }

    #[test]
    fn test_decode_minimal_measurement() {
        let observation =
            HealthThermometerServiceHandler::decode_measurement(&[0x00, 0x72, 0x01, 0x00, 0xFF])
                .unwrap();

        assert!(approx(observation.value, 37.0));
        assert_eq!(observation.unit, ObservationUnit::Celsius);
        assert_eq!(observation.r#type, ObservationType::BodyTemperature);
        assert_eq!(observation.location, ObservationLocation::Unknown);
        assert_eq!(observation.timestamp, observation.received);
    }

    #[test]
    fn test_decode_full_measurement() {
        let value = [
            FLAG_FAHRENHEIT | FLAG_TIMESTAMP | FLAG_TEMPERATURE_TYPE,
            0xE8, 0x03, 0x00, 0xFF, // 1000 * 10^-1
            0xE5, 0x07, 11, 24, 7, 45, 30, // 2021-11-24 07:45:30
            3,    // ear
        ];
        let observation = HealthThermometerServiceHandler::decode_measurement(&value).unwrap();

        assert!(approx(observation.value, 100.0));
        assert_eq!(observation.unit, ObservationUnit::Fahrenheit);
        assert_eq!(observation.location, ObservationLocation::Ear);
        assert_eq!(
            observation.timestamp.naive_local(),
            NaiveDate::from_ymd_opt(2021, 11, 24)
                .unwrap()
                .and_hms_opt(7, 45, 30)
                .unwrap()
        );
    }

    #[test]
    fn test_decode_truncated_timestamp() {
        let value = [FLAG_TIMESTAMP, 0x72, 0x01, 0x00, 0xFF, 0xE5, 0x07, 11];
        assert!(matches!(
            HealthThermometerServiceHandler::decode_measurement(&value),
            Err(Error::ValueTooShort {
                expected: 12,
                actual: 8,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_too_short() {
        assert!(matches!(
            HealthThermometerServiceHandler::decode_measurement(&[0x00, 0x72]),
            Err(Error::ValueTooShort { expected: 5, .. })
        ));
    }

    #[test]
    fn test_measurement_dispatched_and_timestamp_recorded() {
        let (recorder, shared) = recording();
        let mut handler = HealthThermometerServiceHandler::new();
        handler.set_observations_callback(shared);

        let mut store = DeviceInfoStore::new();
        let device = store.get_or_create(ADDRESS);

        let value = [
            FLAG_TIMESTAMP | FLAG_TEMPERATURE_TYPE,
            0x72, 0x01, 0x00, 0xFF, // 37.0
            0xE5, 0x07, 11, 24, 7, 45, 30,
            6, // mouth
        ];
        handler
            .on_characteristic_changed(device, TEMPERATURE_MEASUREMENT_CHAR_UUID, &value)
            .unwrap();

        let batches = recorder.batches.borrow();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[0][0].location, ObservationLocation::Mouth);

        let last = device.last_observation_timestamp().unwrap();
        assert_eq!(last.timestamp(), batches[0][0].timestamp.timestamp());
        assert_eq!(last.nanosecond(), 0);
    }

    #[test]
    fn test_intermediate_temperature_accepted() {
        let (recorder, shared) = recording();
        let mut handler = HealthThermometerServiceHandler::new();
        handler.set_observations_callback(shared);

        let mut store = DeviceInfoStore::new();
        let device = store.get_or_create(ADDRESS);

        handler
            .on_characteristic_changed(
                device,
                INTERMEDIATE_TEMPERATURE_CHAR_UUID,
                &[0x00, 0x72, 0x01, 0x00, 0xFF],
            )
            .unwrap();
        assert_eq!(recorder.batches.borrow().len(), 1);
    }

    #[test]
    fn test_malformed_measurement_not_dispatched() {
        let (recorder, shared) = recording();
        let mut handler = HealthThermometerServiceHandler::new();
        handler.set_observations_callback(shared);

        let mut store = DeviceInfoStore::new();
        let device = store.get_or_create(ADDRESS);

        let result = handler.on_characteristic_changed(
            device,
            TEMPERATURE_MEASUREMENT_CHAR_UUID,
            &[0x00, 0xFF, 0xFF, 0x7F, 0x00],
        );
        assert!(result.is_err());
        assert!(recorder.batches.borrow().is_empty());
        assert!(device.last_observation_timestamp().is_none());
    }
}
