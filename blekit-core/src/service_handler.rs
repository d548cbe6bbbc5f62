//! Service handler registry
//!
//! A [`ServiceHandler`] interprets the characteristics of one GATT service.
//! Handlers are registered under their service UUID; when the stack finds
//! that service on a remote device it looks the handler up and feeds it
//! characteristic values.
//!
//! The registry, not the handler, decides where observations go: on
//! registration it hands the handler its shared
//! [`ObservationDispatcher`](crate::ObservationDispatcher).

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use blekit_types::parse_service_uuid;

use crate::device_info::DeviceInfo;
use crate::dispatch::{LoggingDispatcher, SharedDispatcher};
use crate::error::Result;

/// Logic bound to one GATT service
///
/// Handler state lives in the implementing type and is released by its
/// `Drop`, which the registry runs exactly once per handler.
pub trait ServiceHandler {
    /// Service UUID in canonical hyphenated form
    fn uuid(&self) -> &str;

    /// Called by the registry on registration with the dispatcher the handler
    /// must send its observations to. Replaces any earlier dispatcher.
    fn set_observations_callback(&mut self, dispatcher: SharedDispatcher);

    /// A characteristic of this service was read or notified
    fn on_characteristic_changed(
        &mut self,
        _device: &mut DeviceInfo,
        _characteristic_uuid: &str,
        _value: &[u8],
    ) -> Result<()> {
        Ok(())
    }

    /// The device went away
    fn on_device_disconnected(&mut self, _address: &str) {}
}

/// Registry of service handlers keyed by service UUID
///
/// Keys are parsed UUIDs, so `"0000180F-…"` and `"0000180f-…"` name the same
/// service.
pub struct ServiceHandlerRegistry {
    handlers: HashMap<Uuid, Box<dyn ServiceHandler>>,
    dispatcher: SharedDispatcher,
}

impl ServiceHandlerRegistry {
    /// Create an empty registry that logs observations
    pub fn new() -> Self {
        Self::with_dispatcher(Rc::new(LoggingDispatcher::new()))
    }

    /// Create an empty registry that routes observations to `dispatcher`
    pub fn with_dispatcher(dispatcher: SharedDispatcher) -> Self {
        Self {
            handlers: HashMap::new(),
            dispatcher,
        }
    }

    /// Register `handler` under its service UUID.
    ///
    /// A handler already registered under the same UUID is dropped and
    /// replaced.
    ///
    /// # Panics
    ///
    /// Panics if `handler.uuid()` is not a canonical UUID. Nothing is
    /// registered in that case.
    pub fn add(&mut self, handler: Box<dyn ServiceHandler>) {
        if let Err(e) = self.try_add(handler) {
            panic!("Cannot register service handler: {e}");
        }
    }

    /// Fallible version of [`add`](Self::add)
    pub fn try_add(&mut self, mut handler: Box<dyn ServiceHandler>) -> Result<()> {
        let uuid = parse_service_uuid(handler.uuid())?;

        handler.set_observations_callback(Rc::clone(&self.dispatcher));

        debug!("Registering service handler for {}", uuid);

        if let Some(previous) = self.handlers.insert(uuid, handler) {
            warn!("Replaced service handler for {}", uuid);
            drop(previous);
        }

        Ok(())
    }

    /// Look up the handler registered for `uuid`.
    ///
    /// # Panics
    ///
    /// Panics if `uuid` is not a canonical UUID.
    pub fn get(&self, uuid: &str) -> Option<&dyn ServiceHandler> {
        match self.try_get(uuid) {
            Ok(handler) => handler,
            Err(e) => panic!("Cannot look up service handler: {e}"),
        }
    }

    /// Fallible version of [`get`](Self::get)
    pub fn try_get(&self, uuid: &str) -> Result<Option<&dyn ServiceHandler>> {
        let uuid = parse_service_uuid(uuid)?;
        Ok(self.handlers.get(&uuid).map(|handler| &**handler))
    }

    /// Mutable lookup, used to feed characteristic values to a handler.
    ///
    /// # Panics
    ///
    /// Panics if `uuid` is not a canonical UUID.
    pub fn get_mut(&mut self, uuid: &str) -> Option<&mut dyn ServiceHandler> {
        match self.try_get_mut(uuid) {
            Ok(handler) => handler,
            Err(e) => panic!("Cannot look up service handler: {e}"),
        }
    }

    /// Fallible version of [`get_mut`](Self::get_mut)
    pub fn try_get_mut(&mut self, uuid: &str) -> Result<Option<&mut dyn ServiceHandler>> {
        let uuid = parse_service_uuid(uuid)?;
        Ok(self
            .handlers
            .get_mut(&uuid)
            .map(|handler| &mut **handler as &mut dyn ServiceHandler))
    }

    /// Check if a handler is registered for `uuid` (false for malformed UUIDs)
    pub fn contains(&self, uuid: &str) -> bool {
        matches!(self.try_get(uuid), Ok(Some(_)))
    }

    /// Iterate over all handlers mutably, in no particular order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn ServiceHandler>> {
        self.handlers.values_mut()
    }

    /// UUIDs of all registered services, in no particular order
    pub fn uuids(&self) -> impl Iterator<Item = Uuid> {
        self.handlers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Drop every handler, then the registry itself.
    ///
    /// Each handler's own `Drop` runs exactly once. Dropping the registry
    /// without calling this releases the handlers the same way.
    pub fn free(mut self) {
        let count = self.handlers.len();

        for (uuid, handler) in self.handlers.drain() {
            trace!("Freeing service handler for {}", uuid);
            drop(handler);
        }

        info!("Service handler registry freed ({} handlers)", count);
    }
}

impl Default for ServiceHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServiceHandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandlerRegistry")
            .field("services", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
