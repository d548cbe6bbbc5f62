//! Observation value objects
//!
//! An observation is a single reading produced by a service handler, e.g. one
//! body temperature measurement. They are transient: handlers build them and
//! hand a slice to the registry's dispatcher.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};

/// Timestamp format used in observation display strings (`YYYY-MM-DD HH:MM:SS`)
pub const TIMESTAMP_FORMAT: &str = "%F %R:%S";

/// Unit of an observation value
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ObservationUnit {
    Celsius,
    Fahrenheit,
    Kilograms,
    Pounds,
    MmHg,
    KPa,
    BeatsPerMinute,
    Percentage,
    Meters,
    Inches,
}

impl ObservationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celsius => "Celsius",
            Self::Fahrenheit => "Fahrenheit",
            Self::Kilograms => "kg",
            Self::Pounds => "lb",
            Self::MmHg => "mmHg",
            Self::KPa => "kPa",
            Self::BeatsPerMinute => "bpm",
            Self::Percentage => "%",
            Self::Meters => "m",
            Self::Inches => "in",
        }
    }
}

impl fmt::Display for ObservationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an observation measures
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ObservationType {
    BodyTemperature,
    BodyWeight,
    BodyHeight,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    ArterialPressureMean,
    HeartRate,
    BloodOxygenSaturation,
    BatteryLevel,
}

impl ObservationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BodyTemperature => "body temperature",
            Self::BodyWeight => "body weight",
            Self::BodyHeight => "body height",
            Self::BloodPressureSystolic => "systolic blood pressure",
            Self::BloodPressureDiastolic => "diastolic blood pressure",
            Self::ArterialPressureMean => "mean arterial pressure",
            Self::HeartRate => "heart rate",
            Self::BloodOxygenSaturation => "blood oxygen saturation",
            Self::BatteryLevel => "battery level",
        }
    }
}

impl fmt::Display for ObservationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body location an observation was taken at
///
/// The discriminants follow the Health Thermometer "Temperature Type"
/// characteristic, so `From<u8>` decodes that byte directly. Bytes outside
/// the assigned range map to [`Other`](Self::Other).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ObservationLocation {
    #[default]
    Unknown = 0,
    Armpit = 1,
    Body = 2,
    Ear = 3,
    Finger = 4,
    GastroIntestinalTract = 5,
    Mouth = 6,
    Rectum = 7,
    Toe = 8,
    Tympanum = 9,
    Other = 0xFF,
}

impl ObservationLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Armpit => "armpit",
            Self::Body => "body",
            Self::Ear => "ear",
            Self::Finger => "finger",
            Self::GastroIntestinalTract => "gastro-intestinal tract",
            Self::Mouth => "mouth",
            Self::Rectum => "rectum",
            Self::Toe => "toe",
            Self::Tympanum => "tympanum",
            Self::Other => "other",
        }
    }
}

impl From<u8> for ObservationLocation {
    /// Values outside the assigned range map to [`ObservationLocation::Other`]
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Unknown,
            1 => Self::Armpit,
            2 => Self::Body,
            3 => Self::Ear,
            4 => Self::Finger,
            5 => Self::GastroIntestinalTract,
            6 => Self::Mouth,
            7 => Self::Rectum,
            8 => Self::Toe,
            9 => Self::Tympanum,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ObservationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single sensor reading
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Measured value, in `unit`
    pub value: f32,

    pub unit: ObservationUnit,

    pub r#type: ObservationType,

    /// How long the measurement took (zero for instantaneous readings)
    pub duration: Duration,

    /// When the measurement was taken, as reported by the device
    pub timestamp: DateTime<FixedOffset>,

    /// When the measurement reached us
    pub received: DateTime<FixedOffset>,

    pub location: ObservationLocation,

    /// Sensor index on the originating device
    pub sensor: u32,
}

impl Observation {
    /// Create an instantaneous observation taken and received at `timestamp`
    pub fn new(
        value: f32,
        unit: ObservationUnit,
        r#type: ObservationType,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            value,
            unit,
            r#type,
            duration: Duration::ZERO,
            timestamp,
            received: timestamp,
            location: ObservationLocation::Unknown,
            sensor: 0,
        }
    }

    pub fn with_location(mut self, location: ObservationLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_received(mut self, received: DateTime<FixedOffset>) -> Self {
        self.received = received;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_sensor(mut self, sensor: u32) -> Self {
        self.sensor = sensor;
        self
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "observation{{value={:.1}, unit={}, type={}, utc_timestamp={}, location={}}}",
            self.value,
            self.unit,
            self.r#type,
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.location
        )
    }
}
