//! Feed a session the characteristic values a thermometer would report
//!
//! Run with `RUST_LOG=debug` to see the observation lines.

use tracing_subscriber::EnvFilter;

use blekit::services::battery::{BATTERY_LEVEL_CHAR_UUID, BATTERY_SERVICE_UUID};
use blekit::services::current_time::{CURRENT_TIME_CHAR_UUID, CURRENT_TIME_SERVICE_UUID};
use blekit::services::device_information::{
    DEVICE_INFORMATION_SERVICE_UUID, FIRMWARE_REVISION_CHAR_UUID, MANUFACTURER_NAME_CHAR_UUID,
    MODEL_NUMBER_CHAR_UUID,
};
use blekit::services::health_thermometer::{
    HEALTH_THERMOMETER_SERVICE_UUID, TEMPERATURE_MEASUREMENT_CHAR_UUID,
};
use blekit::BleSession;

fn main() -> blekit::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let address = std::env::var("DEVICE_ADDRESS").unwrap_or_else(|_| "C0:26:DA:01:DA:B1".to_string());

    let mut session = BleSession::new().with_standard_handlers();

    let reads: [(&str, &str, &[u8]); 7] = [
        (DEVICE_INFORMATION_SERVICE_UUID, MANUFACTURER_NAME_CHAR_UUID, b"Omron"),
        (DEVICE_INFORMATION_SERVICE_UUID, MODEL_NUMBER_CHAR_UUID, b"MC-246"),
        (DEVICE_INFORMATION_SERVICE_UUID, FIRMWARE_REVISION_CHAR_UUID, b"1.2.0"),
        (BATTERY_SERVICE_UUID, BATTERY_LEVEL_CHAR_UUID, &[87]),
        // 2021-11-24 08:15:00.5
        (
            CURRENT_TIME_SERVICE_UUID,
            CURRENT_TIME_CHAR_UUID,
            &[0xE5, 0x07, 11, 24, 8, 15, 0, 3, 128, 0x00],
        ),
        // 36.8 Celsius, measured in the ear at 08:14:52
        (
            HEALTH_THERMOMETER_SERVICE_UUID,
            TEMPERATURE_MEASUREMENT_CHAR_UUID,
            &[0x06, 0x70, 0x01, 0x00, 0xFF, 0xE5, 0x07, 11, 24, 8, 14, 52, 3],
        ),
        // 37.1 Celsius, no timestamp or location
        (
            HEALTH_THERMOMETER_SERVICE_UUID,
            TEMPERATURE_MEASUREMENT_CHAR_UUID,
            &[0x00, 0x73, 0x01, 0x00, 0xFF],
        ),
    ];

    for (service, characteristic, value) in reads {
        session.on_characteristic_changed(&address, service, characteristic, value)?;
    }

    let device = session.device(&address);
    println!("✓ {}", device);
    if let Some(time) = device.device_time() {
        println!("✓ Device clock: {}", time);
    }
    if let Some(last) = device.last_observation_timestamp() {
        println!("✓ Last observation: {}", last);
    }

    session.on_device_disconnected(&address);
    session.close();
    println!("✓ Closed");

    Ok(())
}
