//! Battery Service (0x180F)

use tracing::{debug, trace};

use blekit_core::{DeviceInfo, Error, Result, ServiceHandler, SharedDispatcher};
use blekit_types::service_uuid::same_uuid;
use blekit_types::{Observation, ObservationType, ObservationUnit};

use super::{ensure_len, now};

pub const BATTERY_SERVICE_UUID: &str = "0000180f-0000-1000-8000-00805f9b34fb";
pub const BATTERY_LEVEL_CHAR_UUID: &str = "00002a19-0000-1000-8000-00805f9b34fb";

/// Tracks the battery level of each device
#[derive(Default)]
pub struct BatteryServiceHandler {
    observations_callback: Option<SharedDispatcher>,
}

impl BatteryServiceHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ServiceHandler for BatteryServiceHandler {
    fn uuid(&self) -> &str {
        BATTERY_SERVICE_UUID
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
        if !same_uuid(characteristic_uuid, BATTERY_LEVEL_CHAR_UUID) {
            trace!("Ignoring battery characteristic {}", characteristic_uuid);
            return Ok(());
        }

        ensure_len("Battery Level", value, 1)?;

        let level = value[0];
        if level > 100 {
            return Err(Error::InvalidValue {
                characteristic: "Battery Level",
                reason: format!("expected 0-100, got {level}"),
            });
        }

        debug!("{}: battery level {}%", device.address(), level);
        device.set_battery_level(level);

        if let Some(callback) = &self.observations_callback {
            callback.on_observations(&[Observation::new(
                level as f32,
                ObservationUnit::Percentage,
                ObservationType::BatteryLevel,
                now(),
            )]);
        }

        Ok(())
    }
}
