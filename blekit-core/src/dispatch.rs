//! Observation dispatch
//!
//! Handlers never log or forward observations themselves. The registry
//! injects a shared [`ObservationDispatcher`] into each handler when it is
//! registered, and the handler calls it with every batch it produces.

use std::rc::Rc;

use tracing::debug;

use blekit_types::Observation;

/// Dispatcher shared between a registry and its handlers
pub type SharedDispatcher = Rc<dyn ObservationDispatcher>;

/// Strategy for surfacing observations produced by service handlers
#[cfg_attr(test, mockall::automock)]
pub trait ObservationDispatcher {
    /// Receive an ordered batch of observations.
    ///
    /// The slice is only borrowed for the duration of the call.
    fn on_observations(&self, observations: &[Observation]);
}

/// Default dispatcher: one debug line per observation
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingDispatcher;

impl LoggingDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Lines [`on_observations`](ObservationDispatcher::on_observations) emits
    /// for `observations`, in order
    pub fn format_lines(observations: &[Observation]) -> Vec<String> {
        observations.iter().map(ToString::to_string).collect()
    }
}

impl ObservationDispatcher for LoggingDispatcher {
    fn on_observations(&self, observations: &[Observation]) {
        for line in Self::format_lines(observations) {
            debug!("{}", line);
        }
    }
}
