//! Type definitions for blekit

pub mod error;
pub mod observation;
pub mod service_uuid;

pub use error::{Error, Result};
pub use observation::{Observation, ObservationLocation, ObservationType, ObservationUnit};
pub use service_uuid::{from_short, parse_service_uuid};
