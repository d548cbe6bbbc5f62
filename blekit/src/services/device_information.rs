//! Device Information Service (0x180A)

use tracing::{debug, trace};

use blekit_core::{DeviceInfo, Result, ServiceHandler, SharedDispatcher};
use blekit_types::service_uuid::same_uuid;

use super::decode_utf8;

pub const DEVICE_INFORMATION_SERVICE_UUID: &str = "0000180a-0000-1000-8000-00805f9b34fb";
pub const MANUFACTURER_NAME_CHAR_UUID: &str = "00002a29-0000-1000-8000-00805f9b34fb";
pub const MODEL_NUMBER_CHAR_UUID: &str = "00002a24-0000-1000-8000-00805f9b34fb";
pub const SERIAL_NUMBER_CHAR_UUID: &str = "00002a25-0000-1000-8000-00805f9b34fb";
pub const FIRMWARE_REVISION_CHAR_UUID: &str = "00002a26-0000-1000-8000-00805f9b34fb";
pub const HARDWARE_REVISION_CHAR_UUID: &str = "00002a27-0000-1000-8000-00805f9b34fb";
pub const SOFTWARE_REVISION_CHAR_UUID: &str = "00002a28-0000-1000-8000-00805f9b34fb";

type Setter = fn(&mut DeviceInfo, String);

static FIELDS: [(&str, &str, Setter); 6] = [
    (MANUFACTURER_NAME_CHAR_UUID, "manufacturer", |d, v| d.set_manufacturer(v)),
    (MODEL_NUMBER_CHAR_UUID, "model", |d, v| d.set_model(v)),
    (SERIAL_NUMBER_CHAR_UUID, "serial number", |d, v| d.set_serial_number(v)),
    (FIRMWARE_REVISION_CHAR_UUID, "firmware version", |d, v| d.set_firmware_version(v)),
    (HARDWARE_REVISION_CHAR_UUID, "hardware version", |d, v| d.set_hardware_version(v)),
    (SOFTWARE_REVISION_CHAR_UUID, "software version", |d, v| d.set_software_version(v)),
];

/// Copies the Device Information strings into the device record
///
/// Produces no observations.
#[derive(Debug, Default)]
pub struct DeviceInformationServiceHandler;

impl DeviceInformationServiceHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ServiceHandler for DeviceInformationServiceHandler {
    fn uuid(&self) -> &str {
        DEVICE_INFORMATION_SERVICE_UUID
    }

    fn set_observations_callback(&mut self, _dispatcher: SharedDispatcher) {}

    fn on_characteristic_changed(
        &mut self,
        device: &mut DeviceInfo,
        characteristic_uuid: &str,
        value: &[u8],
    ) -> Result<()> {
        let Some((_, name, set)) = FIELDS
            .iter()
            .find(|(uuid, _, _)| same_uuid(characteristic_uuid, uuid))
        else {
            trace!("Ignoring device information characteristic {}", characteristic_uuid);
            return Ok(());
        };

        let text = decode_utf8(value);
        if text.is_empty() {
            trace!("{}: empty {}", device.address(), name);
            return Ok(());
        }

        debug!("{}: {} = {:?}", device.address(), name, text);
        set(device, text);

        Ok(())
    }
}
