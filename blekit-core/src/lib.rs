//! # blekit-core
//!
//! Runtime registries shared by a BLE stack:
//! - [`DeviceInfoStore`]: metadata records keyed by device address
//! - [`ServiceHandlerRegistry`]: pluggable GATT service handlers keyed by
//!   service UUID
//! - [`ObservationDispatcher`]: the route observations take out of a handler

pub mod device_info;
pub mod dispatch;
pub mod error;
pub mod service_handler;
pub mod timestamp;

pub use device_info::{DeviceInfo, DeviceInfoStore};
pub use dispatch::{LoggingDispatcher, ObservationDispatcher, SharedDispatcher};
pub use error::{Error, Result};
pub use service_handler::{ServiceHandler, ServiceHandlerRegistry};
pub use timestamp::normalize_timestamp;
