//! # blekit
//!
//! Device metadata and GATT service handling for a BLE stack.
//!
//! ## Features
//!
//! - Per-device metadata store with field-by-field updates
//! - Registry of service handlers keyed by service UUID
//! - Uniform observation dispatch from every handler
//! - Handlers for the Battery, Device Information, Current Time and Health
//!   Thermometer services
//!
//! ## Quick Start
//!
//! ```
//! use blekit::BleSession;
//! use blekit::services::device_information::{
//!     DEVICE_INFORMATION_SERVICE_UUID, MODEL_NUMBER_CHAR_UUID,
//! };
//!
//! fn main() -> blekit::Result<()> {
//!     let mut session = BleSession::new().with_standard_handlers();
//!
//!     // A value read from a remote device
//!     session.on_characteristic_changed(
//!         "00:11:22:33:44:55",
//!         DEVICE_INFORMATION_SERVICE_UUID,
//!         MODEL_NUMBER_CHAR_UUID,
//!         b"MC-246",
//!     )?;
//!
//!     println!("{}", session.device("00:11:22:33:44:55"));
//!
//!     session.close();
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod services;
pub mod session;

// Re-exports
pub use error::{Error, Result};
pub use session::BleSession;

// Re-export core types
pub use blekit_core::{
    normalize_timestamp, DeviceInfo, DeviceInfoStore, LoggingDispatcher, ObservationDispatcher,
    ServiceHandler, ServiceHandlerRegistry, SharedDispatcher,
};
pub use blekit_types::{Observation, ObservationLocation, ObservationType, ObservationUnit};
