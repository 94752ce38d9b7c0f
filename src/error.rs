//! Shared error types for pacing primitives.

use thiserror::Error;

/// Type-erased error produced by caller-supplied operations.
///
/// Operations are opaque capabilities; the poller never inspects their
/// failures beyond logging and forwarding them to the error callback.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Construction-time configuration errors.
///
/// Misconfiguration fails fast at `build()` rather than manifesting as a
/// silent no-op at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration contains an invalid value
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid { message: message.into() }
    }
}

/// Result type for configuration builders
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid("max_attempts must be at least 1");
        assert!(err.to_string().contains("max_attempts must be at least 1"));
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
