//! Error types for Gleaner.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`GleanerError`] - Top-level error type for all Gleaner operations
//! - [`ConfigError`] - Malformed collector configuration
//! - [`CollectError`] - Failures while ingesting or disposing a single event
//! - [`BusError`] - Failures reported by event bus listeners

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Gleaner operations.
#[derive(Error, Debug)]
pub enum GleanerError {
    /// The collector configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An event could not be collected.
    #[error("collect error: {0}")]
    Collect(#[from] CollectError),

    /// A bus listener failed.
    #[error("bus error: {0}")]
    Bus(#[from] BusError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors detected while validating collector options.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `max` was set to zero.
    #[error("max must be a positive item count")]
    ZeroLimit,

    /// A timer duration was set to zero.
    #[error("{option} duration must be greater than zero")]
    ZeroDuration {
        /// Name of the offending option.
        option: &'static str,
    },

    /// Timers were configured outside of a Tokio runtime.
    #[error("collector timers require a running Tokio runtime")]
    NoRuntime,
}

/// Errors raised while handling a single raw event.
///
/// These never terminate the collector; they abort the one call that
/// produced them.
#[derive(Error, Debug)]
pub enum CollectError {
    /// The user-supplied filter failed.
    #[error("collector filter failed")]
    Filter(#[source] BoxError),
}

/// Errors reported while publishing on an event bus.
#[derive(Error, Debug)]
pub enum BusError {
    /// A listener returned an error. Delivery to other listeners continues.
    #[error("listener for `{kind}` failed")]
    Listener {
        /// Debug rendering of the event kind being delivered.
        kind: String,
        /// The listener's error.
        #[source]
        source: BoxError,
    },
}

// Convenience conversions
impl From<BoxError> for GleanerError {
    fn from(err: BoxError) -> Self {
        GleanerError::Custom(err)
    }
}

impl From<BoxError> for CollectError {
    fn from(err: BoxError) -> Self {
        CollectError::Filter(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ZeroDuration { option: "idle" };
        assert_eq!(err.to_string(), "idle duration must be greater than zero");
        assert_eq!(
            ConfigError::ZeroLimit.to_string(),
            "max must be a positive item count"
        );
    }

    #[test]
    fn test_collect_error_keeps_source() {
        let err = CollectError::from(BoxError::from("boom"));
        assert_eq!(err.to_string(), "collector filter failed");
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".into()));
    }

    #[test]
    fn test_gleaner_error_from_config() {
        let err: GleanerError = ConfigError::NoRuntime.into();
        assert!(matches!(err, GleanerError::Config(ConfigError::NoRuntime)));
        assert!(err.to_string().starts_with("configuration error"));
    }
}
