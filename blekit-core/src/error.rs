//! Error types for blekit-core

/// Result type alias for blekit-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core errors
///
/// Contract violations (such as registering a handler under a malformed
/// UUID through [`ServiceHandlerRegistry::add`](crate::ServiceHandlerRegistry::add))
/// panic instead of returning one of these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Characteristic value is shorter than its format requires
    #[error("Value of {characteristic} too short: expected at least {expected} bytes, got {actual} bytes")]
    ValueTooShort {
        characteristic: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Characteristic value is well-sized but its content is out of range
    #[error("Invalid value for {characteristic}: {reason}")]
    InvalidValue {
        characteristic: &'static str,
        reason: String,
    },

    #[error("Type error: {0}")]
    Types(#[from] blekit_types::Error),
}

impl Error {
    /// Check if the error came from a malformed characteristic value
    /// (as opposed to a caller mistake)
    pub fn is_malformed_value(&self) -> bool {
        matches!(
            self,
            Self::ValueTooShort { .. } | Self::InvalidValue { .. }
        )
    }
}
