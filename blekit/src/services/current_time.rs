//! Current Time Service (0x1805)

use std::rc::Rc;

use tracing::{debug, trace};

use blekit_core::{DeviceInfo, Result, ServiceHandler, SharedDispatcher};
use blekit_types::service_uuid::same_uuid;

use super::{decode_date_time, ensure_len};

pub const CURRENT_TIME_SERVICE_UUID: &str = "00001805-0000-1000-8000-00805f9b34fb";
pub const CURRENT_TIME_CHAR_UUID: &str = "00002a2b-0000-1000-8000-00805f9b34fb";

const CHARACTERISTIC: &str = "Current Time";

/// Current Time is Exact Time 256 (9 bytes) followed by an adjust reason
const CURRENT_TIME_LEN: usize = 10;

/// 1/256 s, exact
const NANOS_PER_FRACTION256: u32 = 3_906_250;

/// Reads the device clock into [`DeviceInfo::device_time`]
///
/// Produces no observations.
#[derive(Debug, Default)]
pub struct CurrentTimeServiceHandler;

impl CurrentTimeServiceHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ServiceHandler for CurrentTimeServiceHandler {
    fn uuid(&self) -> &str {
        CURRENT_TIME_SERVICE_UUID
    }

    fn set_observations_callback(&mut self, _dispatcher: SharedDispatcher) {}

    fn on_characteristic_changed(
        &mut self,
        device: &mut DeviceInfo,
        characteristic_uuid: &str,
        value: &[u8],
    ) -> Result<()> {
        if !same_uuid(characteristic_uuid, CURRENT_TIME_CHAR_UUID) {
            trace!("Ignoring current time characteristic {}", characteristic_uuid);
            return Ok(());
        }

        ensure_len(CHARACTERISTIC, value, CURRENT_TIME_LEN)?;

        // value[7] is the day of week, implied by the date
        let nanos = u32::from(value[8]) * NANOS_PER_FRACTION256;
        let device_time = decode_date_time(CHARACTERISTIC, &value[..7], nanos)?;

        debug!(
            "{}: device time {} (adjust reason 0x{:02X})",
            device.address(),
            device_time,
            value[9]
        );
        device.set_device_time(Rc::new(device_time));

        Ok(())
    }
}
