//! Error types for lifecycle operations.
//!
//! A missing container is not an error here: lookups return `None` and
//! transitions return `false`. Errors are reserved for malformed input and
//! genuine daemon failures.

use dockside_daemon::DaemonError;
use thiserror::Error;

/// A result type using `LifecycleError`.
pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Errors that can occur in lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The run configuration body is not valid YAML or JSON of the expected shape.
    #[error("invalid run parameters: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The run configuration parsed but cannot be acted upon.
    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),

    /// The daemon refused to create or start the container.
    #[error("{source}")]
    Creation {
        /// The container name that was requested.
        name: String,
        /// The daemon's rejection, verbatim.
        #[source]
        source: DaemonError,
    },

    /// Any other daemon failure.
    #[error(transparent)]
    Daemon(#[from] DaemonError),
}

impl LifecycleError {
    /// Returns true if the caller's input was at fault.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::InvalidConfig(_))
    }

    /// Returns true if this error might be resolved by retrying.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::Creation { source, .. } | Self::Daemon(source) => source.is_retriable(),
            Self::Parse(_) | Self::InvalidConfig(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_error_carries_daemon_message() {
        let err = LifecycleError::Creation {
            name: "web".to_string(),
            source: DaemonError::Conflict(
                "Conflict. The container name \"/web\" is already in use".to_string(),
            ),
        };

        assert_eq!(
            err.to_string(),
            "Conflict. The container name \"/web\" is already in use"
        );
        assert!(!err.is_invalid_input());
        assert!(!err.is_retriable());
    }

    #[test]
    fn invalid_config_is_input_error() {
        let err = LifecycleError::InvalidConfig("image is required".to_string());
        assert!(err.is_invalid_input());
        assert_eq!(
            err.to_string(),
            "invalid run configuration: image is required"
        );
    }
}
