//! Standard GATT service handlers
//!
//! Each handler decodes the characteristics of one Bluetooth SIG service and
//! writes what it learns into the device's
//! [`DeviceInfo`](blekit_core::DeviceInfo) record. Handlers
//! that produce readings also push them through the dispatcher the registry
//! injected.

pub mod battery;
pub mod current_time;
pub mod device_information;
pub mod health_thermometer;

pub use battery::BatteryServiceHandler;
pub use current_time::CurrentTimeServiceHandler;
pub use device_information::DeviceInformationServiceHandler;
pub use health_thermometer::HealthThermometerServiceHandler;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};

use blekit_core::{Error, Result};

/// Fail with [`Error::ValueTooShort`] unless `value` holds `expected` bytes
pub(crate) fn ensure_len(characteristic: &'static str, value: &[u8], expected: usize) -> Result<()> {
    if value.len() < expected {
        return Err(Error::ValueTooShort {
            characteristic,
            expected,
            actual: value.len(),
        });
    }
    Ok(())
}

/// Decode the 7-byte GATT "Date Time" layout (year u16 LE, month, day,
/// hours, minutes, seconds) as a local wall-clock time
pub(crate) fn decode_date_time(
    characteristic: &'static str,
    bytes: &[u8],
    nanos: u32,
) -> Result<DateTime<FixedOffset>> {
    ensure_len(characteristic, bytes, 7)?;

    let year = u16::from_le_bytes([bytes[0], bytes[1]]);
    let (month, day) = (bytes[2], bytes[3]);
    let (hours, minutes, seconds) = (bytes[4], bytes[5], bytes[6]);

    let invalid = |reason: String| Error::InvalidValue {
        characteristic,
        reason,
    };

    if year == 0 || month == 0 || day == 0 {
        return Err(invalid(format!(
            "date not known ({year:04}-{month:02}-{day:02})"
        )));
    }

    let naive = NaiveDate::from_ymd_opt(year.into(), month.into(), day.into())
        .and_then(|date| date.and_hms_nano_opt(hours.into(), minutes.into(), seconds.into(), nanos))
        .ok_or_else(|| {
            invalid(format!(
                "{year:04}-{month:02}-{day:02} {hours:02}:{minutes:02}:{seconds:02} out of range"
            ))
        })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.fixed_offset())
        .ok_or_else(|| invalid(format!("{naive} does not exist in local time")))
}

/// Timestamp for readings that carry none of their own
pub(crate) fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Decode a UTF-8 string characteristic, dropping trailing NUL padding
pub(crate) fn decode_utf8(value: &[u8]) -> String {
    String::from_utf8_lossy(value)
        .trim_end_matches('\0')
        .to_string()
}
