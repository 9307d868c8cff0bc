//! Error types for daemon operations.

use thiserror::Error;

/// A result type using `DaemonError`.
pub type Result<T> = std::result::Result<T, DaemonError>;

/// Errors reported by, or while talking to, the container daemon.
///
/// Messages coming back from the daemon are carried verbatim.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// The daemon has no such container or image.
    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with daemon state (e.g. the name is taken).
    #[error("{0}")]
    Conflict(String),

    /// The container was already in the requested state.
    #[error("container already in requested state: {0}")]
    NotModified(String),

    /// Any other error response from the daemon.
    #[error("{message}")]
    Server {
        /// HTTP status code returned by the daemon.
        status_code: u16,
        /// The daemon's error message.
        message: String,
    },

    /// The daemon answered with something we cannot interpret.
    #[error("malformed daemon response: {0}")]
    Malformed(String),

    /// Transport or protocol failure (daemon unreachable, timeout, ...).
    #[error(transparent)]
    Docker(bollard::errors::Error),
}

impl DaemonError {
    /// Returns true if the daemon reported the target as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true if the daemon reported the mutation as a no-op.
    #[must_use]
    pub const fn is_not_modified(&self) -> bool {
        matches!(self, Self::NotModified(_))
    }

    /// Returns true if this error might be resolved by retrying.
    ///
    /// Nothing in dockside retries automatically; this is informational.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Docker(_))
    }
}

impl From<bollard::errors::Error> for DaemonError {
    fn from(err: bollard::errors::Error) -> Self {
        match err {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 304,
                message,
            } => Self::NotModified(message),
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404,
                message,
            } => Self::NotFound(message),
            bollard::errors::Error::DockerResponseServerError {
                status_code: 409,
                message,
            } => Self::Conflict(message),
            bollard::errors::Error::DockerResponseServerError {
                status_code,
                message,
            } => Self::Server {
                status_code,
                message,
            },
            other => Self::Docker(other),
        }
    }
}
