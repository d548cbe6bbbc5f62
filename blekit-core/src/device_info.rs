//! Per-device metadata store
//!
//! A BLE stack learns about a device piece by piece: the Device Information
//! service is read characteristic by characteristic, the battery level and
//! current time arrive on their own schedule. Each field of a [`DeviceInfo`]
//! is therefore replaced independently, never the whole record.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use tracing::{debug, info, trace};

use crate::timestamp::normalize_timestamp;

/// Metadata known about one device
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    address: String,
    manufacturer: Option<String>,
    model: Option<String>,
    serial_number: Option<String>,
    firmware_version: Option<String>,
    software_version: Option<String>,
    hardware_version: Option<String>,
    battery_level: u8,
    device_time: Option<Rc<DateTime<FixedOffset>>>,
    created: DateTime<Local>,
    last_observation_timestamp: Option<DateTime<Local>>,
}

impl DeviceInfo {
    fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            manufacturer: None,
            model: None,
            serial_number: None,
            firmware_version: None,
            software_version: None,
            hardware_version: None,
            battery_level: 0,
            device_time: None,
            created: Local::now(),
            last_observation_timestamp: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.serial_number.as_deref()
    }

    pub fn firmware_version(&self) -> Option<&str> {
        self.firmware_version.as_deref()
    }

    pub fn software_version(&self) -> Option<&str> {
        self.software_version.as_deref()
    }

    pub fn hardware_version(&self) -> Option<&str> {
        self.hardware_version.as_deref()
    }

    /// Battery level in percent (0 until reported)
    pub fn battery_level(&self) -> u8 {
        self.battery_level
    }

    /// Time reported by the device's own clock, exactly as it was set
    pub fn device_time(&self) -> Option<&Rc<DateTime<FixedOffset>>> {
        self.device_time.as_ref()
    }

    /// When this record was first created; never changes
    pub fn created(&self) -> &DateTime<Local> {
        &self.created
    }

    /// Local, whole-second time of the most recent observation
    pub fn last_observation_timestamp(&self) -> Option<&DateTime<Local>> {
        self.last_observation_timestamp.as_ref()
    }

    pub fn set_manufacturer(&mut self, manufacturer: impl Into<String>) {
        self.manufacturer = Some(manufacturer.into());
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = Some(model.into());
    }

    pub fn set_serial_number(&mut self, serial_number: impl Into<String>) {
        self.serial_number = Some(serial_number.into());
    }

    pub fn set_firmware_version(&mut self, firmware_version: impl Into<String>) {
        self.firmware_version = Some(firmware_version.into());
    }

    pub fn set_hardware_version(&mut self, hardware_version: impl Into<String>) {
        self.hardware_version = Some(hardware_version.into());
    }

    pub fn set_software_version(&mut self, software_version: impl Into<String>) {
        self.software_version = Some(software_version.into());
    }

    pub fn set_battery_level(&mut self, battery_level: u8) {
        self.battery_level = battery_level;
    }

    /// Store the device clock reading.
    ///
    /// The value is shared, not copied: the stored `Rc` points at the same
    /// allocation as `device_time`, so offset and sub-second precision are
    /// kept as is.
    pub fn set_device_time(&mut self, device_time: Rc<DateTime<FixedOffset>>) {
        self.device_time = Some(device_time);
    }

    /// Record when the latest observation was taken.
    ///
    /// The stored value is [`normalize_timestamp`] of the input: whole
    /// seconds, local time. Passing the instant that is already stored is a
    /// no-op.
    pub fn set_last_observation_timestamp<Tz: TimeZone>(&mut self, timestamp: &DateTime<Tz>) {
        if self
            .last_observation_timestamp
            .as_ref()
            .is_some_and(|current| current == timestamp)
        {
            trace!(
                "{}: last observation timestamp unchanged",
                self.address
            );
            return;
        }

        self.last_observation_timestamp = Some(normalize_timestamp(timestamp));
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeviceInfo[{}, manufacturer: {}, model: {}, battery: {}%]",
            self.address,
            self.manufacturer.as_deref().unwrap_or("-"),
            self.model.as_deref().unwrap_or("-"),
            self.battery_level
        )
    }
}

/// Store of [`DeviceInfo`] records keyed by device address
///
/// Owns every record. Records are never removed one by one; [`close`]
/// drops them all at once.
///
/// Addresses are opaque keys; a BLE MAC address (`"00:11:22:33:44:55"`) is
/// the usual choice but nothing checks it.
///
/// [`close`]: DeviceInfoStore::close
#[derive(Debug, Default)]
pub struct DeviceInfoStore {
    records: HashMap<String, DeviceInfo>,
}

impl DeviceInfoStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Get the record for `address`, creating an empty one on first use.
    ///
    /// Later calls with the same address return the same record, with the
    /// same `created` time.
    pub fn get_or_create(&mut self, address: &str) -> &mut DeviceInfo {
        self.records
            .entry(address.to_string())
            .or_insert_with(|| {
                debug!("Creating device info for {}", address);
                DeviceInfo::new(address)
            })
    }

    /// Get the record for `address` if one exists
    pub fn get(&self, address: &str) -> Option<&DeviceInfo> {
        self.records.get(address)
    }

    /// Number of devices with a record
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all records, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &DeviceInfo> {
        self.records.values()
    }

    /// Drop every record.
    ///
    /// The store is empty afterwards; the next [`get_or_create`] creates a
    /// fresh record.
    ///
    /// [`get_or_create`]: DeviceInfoStore::get_or_create
    pub fn close(&mut self) {
        let records = std::mem::take(&mut self.records);
        info!("Closing device info store ({} records)", records.len());
    }
}
