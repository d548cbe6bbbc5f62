//! BLE session
//!
//! The owning scope for one [`DeviceInfoStore`] and one
//! [`ServiceHandlerRegistry`]. The surrounding stack (adapter, connection
//! handling, GATT discovery) holds a `BleSession` and forwards what it reads
//! from remote devices.

use tracing::{debug, info, trace};

use blekit_core::{
    DeviceInfo, DeviceInfoStore, ServiceHandler, ServiceHandlerRegistry, SharedDispatcher,
};

use crate::error::Result;
use crate::services::{
    BatteryServiceHandler, CurrentTimeServiceHandler, DeviceInformationServiceHandler,
    HealthThermometerServiceHandler,
};

/// Device metadata and service handlers for one BLE stack
///
/// # Examples
///
/// ```
/// use blekit::BleSession;
/// use blekit::services::battery::{BATTERY_LEVEL_CHAR_UUID, BATTERY_SERVICE_UUID};
///
/// let mut session = BleSession::new().with_standard_handlers();
///
/// let handled = session
///     .on_characteristic_changed(
///         "00:11:22:33:44:55",
///         BATTERY_SERVICE_UUID,
///         BATTERY_LEVEL_CHAR_UUID,
///         &[87],
///     )
///     .unwrap();
///
/// assert!(handled);
/// assert_eq!(session.device("00:11:22:33:44:55").battery_level(), 87);
///
/// session.close();
/// ```
#[derive(Debug, Default)]
pub struct BleSession {
    devices: DeviceInfoStore,
    handlers: ServiceHandlerRegistry,
}

impl BleSession {
    /// Create a session whose observations are logged
    pub fn new() -> Self {
        Self {
            devices: DeviceInfoStore::new(),
            handlers: ServiceHandlerRegistry::new(),
        }
    }

    /// Create a session whose observations go to `dispatcher`
    pub fn with_dispatcher(dispatcher: SharedDispatcher) -> Self {
        Self {
            devices: DeviceInfoStore::new(),
            handlers: ServiceHandlerRegistry::with_dispatcher(dispatcher),
        }
    }

    /// Register the Battery, Device Information, Current Time and Health
    /// Thermometer handlers
    pub fn with_standard_handlers(mut self) -> Self {
        self.handlers.add(Box::new(BatteryServiceHandler::new()));
        self.handlers
            .add(Box::new(DeviceInformationServiceHandler::new()));
        self.handlers.add(Box::new(CurrentTimeServiceHandler::new()));
        self.handlers
            .add(Box::new(HealthThermometerServiceHandler::new()));
        self
    }

    /// Register a handler, replacing any handler for the same service
    ///
    /// # Errors
    ///
    /// Returns an error if the handler's UUID is malformed.
    pub fn register_handler(&mut self, handler: Box<dyn ServiceHandler>) -> Result<()> {
        self.handlers.try_add(handler)?;
        Ok(())
    }

    /// Record for `address`, created on first use
    pub fn device(&mut self, address: &str) -> &mut DeviceInfo {
        self.devices.get_or_create(address)
    }

    pub fn devices(&self) -> &DeviceInfoStore {
        &self.devices
    }

    pub fn handlers(&self) -> &ServiceHandlerRegistry {
        &self.handlers
    }

    /// Route a characteristic value to the handler for its service.
    ///
    /// Returns `Ok(false)` if no handler is registered for `service_uuid`.
    /// In that case no device record is created.
    ///
    /// # Errors
    ///
    /// Returns an error if `service_uuid` is malformed or the handler
    /// rejects the value.
    pub fn on_characteristic_changed(
        &mut self,
        address: &str,
        service_uuid: &str,
        characteristic_uuid: &str,
        value: &[u8],
    ) -> Result<bool> {
        let Some(handler) = self.handlers.try_get_mut(service_uuid)? else {
            trace!("{}: no handler for service {}", address, service_uuid);
            return Ok(false);
        };

        let device = self.devices.get_or_create(address);
        handler.on_characteristic_changed(device, characteristic_uuid, value)?;

        Ok(true)
    }

    /// Tell every handler that `address` disconnected
    pub fn on_device_disconnected(&mut self, address: &str) {
        debug!("{}: disconnected", address);

        for handler in self.handlers.iter_mut() {
            handler.on_device_disconnected(address);
        }
    }

    /// Free all handlers, then close the device store
    pub fn close(self) {
        let Self {
            mut devices,
            handlers,
        } = self;

        handlers.free();
        devices.close();

        info!("Session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use blekit_core::ObservationDispatcher;
    use blekit_types::{Observation, ObservationLocation, ObservationType};
    use chrono::Timelike;
    use mockall::mock;
    use pretty_assertions::assert_eq;

    use crate::error::Error;
    use crate::services::battery::{BATTERY_LEVEL_CHAR_UUID, BATTERY_SERVICE_UUID};
    use crate::services::current_time::{CURRENT_TIME_CHAR_UUID, CURRENT_TIME_SERVICE_UUID};
    use crate::services::device_information::{
        DEVICE_INFORMATION_SERVICE_UUID, MANUFACTURER_NAME_CHAR_UUID,
    };
    use crate::services::health_thermometer::{
        HEALTH_THERMOMETER_SERVICE_UUID, TEMPERATURE_MEASUREMENT_CHAR_UUID,
    };

    mock! {
        Dispatcher {}

        impl ObservationDispatcher for Dispatcher {
            fn on_observations(&self, observations: &[Observation]);
        }
    }

    const ADDRESS: &str = "00:11:22:33:44:55";

    struct DisconnectCounter {
        disconnects: Rc<Cell<usize>>,
    }

    impl ServiceHandler for DisconnectCounter {
        fn uuid(&self) -> &str {
            "11111111-1111-1111-1111-111111111111"
        }

        fn set_observations_callback(&mut self, _dispatcher: SharedDispatcher) {}

        fn on_device_disconnected(&mut self, _address: &str) {
            self.disconnects.set(self.disconnects.get() + 1);
        }
    }

    #[test]
    fn test_session_new() {
        let session = BleSession::new();
        assert!(session.devices().is_empty());
        assert!(session.handlers().is_empty());
    }

    #[test]
    fn test_standard_handlers_registered() {
        let session = BleSession::new().with_standard_handlers();
        assert_eq!(session.handlers().len(), 4);
        assert!(session.handlers().contains(BATTERY_SERVICE_UUID));
        assert!(session.handlers().contains(DEVICE_INFORMATION_SERVICE_UUID));
        assert!(session.handlers().contains(HEALTH_THERMOMETER_SERVICE_UUID));
    }

    #[test]
    fn test_routes_to_handler() {
        let mut session = BleSession::new().with_standard_handlers();

        let handled = session
            .on_characteristic_changed(
                ADDRESS,
                DEVICE_INFORMATION_SERVICE_UUID,
                MANUFACTURER_NAME_CHAR_UUID,
                b"Omron",
            )
            .unwrap();

        assert!(handled);
        assert_eq!(session.device(ADDRESS).manufacturer(), Some("Omron"));
    }

    #[test]
    fn test_device_clock_with_half_second() {
        let mut session = BleSession::new().with_standard_handlers();

        session
            .on_characteristic_changed(
                ADDRESS,
                CURRENT_TIME_SERVICE_UUID,
                CURRENT_TIME_CHAR_UUID,
                &[0xE5, 0x07, 11, 24, 8, 15, 0, 3, 128, 0x00],
            )
            .unwrap();

        let time = session.device(ADDRESS).device_time().unwrap();
        assert_eq!(time.nanosecond(), 500_000_000);
    }

    #[test]
    fn test_unhandled_service() {
        let mut session = BleSession::new();

        let handled = session
            .on_characteristic_changed(ADDRESS, BATTERY_SERVICE_UUID, BATTERY_LEVEL_CHAR_UUID, &[1])
            .unwrap();

        assert!(!handled);
        assert!(session.devices().get(ADDRESS).is_none());
    }

    #[test]
    fn test_malformed_service_uuid() {
        let mut session = BleSession::new().with_standard_handlers();

        let result = session.on_characteristic_changed(ADDRESS, "180f", BATTERY_LEVEL_CHAR_UUID, &[1]);
        assert!(matches!(
            result,
            Err(Error::Core(blekit_core::Error::Types(
                blekit_types::Error::InvalidUuid(_)
            )))
        ));
    }

    #[test]
    fn test_handler_error_propagates() {
        let mut session = BleSession::new().with_standard_handlers();

        let result = session.on_characteristic_changed(
            ADDRESS,
            BATTERY_SERVICE_UUID,
            BATTERY_LEVEL_CHAR_UUID,
            &[],
        );
        assert!(matches!(
            result,
            Err(Error::Core(blekit_core::Error::ValueTooShort { .. }))
        ));
    }

    #[test]
    fn test_observations_reach_session_dispatcher() {
        let mut mock = MockDispatcher::new();
        mock.expect_on_observations()
            .withf(|observations| {
                observations.len() == 1
                    && observations[0].r#type == ObservationType::BodyTemperature
                    && observations[0].location == ObservationLocation::Armpit
            })
            .times(1)
            .return_const(());

        let mut session = BleSession::with_dispatcher(Rc::new(mock)).with_standard_handlers();

        session
            .on_characteristic_changed(
                ADDRESS,
                HEALTH_THERMOMETER_SERVICE_UUID,
                TEMPERATURE_MEASUREMENT_CHAR_UUID,
                &[0x04, 0x72, 0x01, 0x00, 0xFF, 1],
            )
            .unwrap();

        assert!(session.device(ADDRESS).last_observation_timestamp().is_some());
    }

    #[test]
    fn test_register_handler_rejects_bad_uuid() {
        struct Bad;

        impl ServiceHandler for Bad {
            fn uuid(&self) -> &str {
                "not-a-uuid"
            }

            fn set_observations_callback(&mut self, _dispatcher: SharedDispatcher) {}
        }

        let mut session = BleSession::new();
        assert!(matches!(
            session.register_handler(Box::new(Bad)),
            Err(Error::Core(blekit_core::Error::Types(
                blekit_types::Error::InvalidUuid(_)
            )))
        ));
        assert!(session.handlers().is_empty());
    }

    #[test]
    fn test_disconnect_reaches_every_handler() {
        let disconnects = Rc::new(Cell::new(0));
        let mut session = BleSession::new().with_standard_handlers();
        session
            .register_handler(Box::new(DisconnectCounter {
                disconnects: Rc::clone(&disconnects),
            }))
            .unwrap();

        session.on_device_disconnected(ADDRESS);
        assert_eq!(disconnects.get(), 1);
    }

    #[test]
    fn test_close_then_reopen() {
        let mut session = BleSession::new().with_standard_handlers();
        session.device(ADDRESS).set_model("MC-246");
        session.close();

        let mut session = BleSession::new();
        assert_eq!(session.device(ADDRESS).model(), None);
    }
}
