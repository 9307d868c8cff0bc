//! The daemon client interface.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ContainerHandle, Filters, RunSpec};

/// Primitives the container daemon offers.
///
/// Implementations keep no state between calls and add no locking; the
/// daemon serializes concurrent mutations itself.
#[async_trait]
pub trait DaemonClient: Send + Sync {
    /// Check that the daemon is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon does not answer.
    async fn ping(&self) -> Result<()>;

    /// List containers matching `filters`, including stopped ones when `all`
    /// is set. Every match is fully resolved before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon rejects the query or is unreachable.
    async fn list_containers(&self, all: bool, filters: &Filters) -> Result<Vec<ContainerHandle>>;

    /// Fetch one container's full state.
    ///
    /// # Errors
    ///
    /// Returns `DaemonError::NotFound` if no such container exists.
    async fn inspect_container(&self, id: &str) -> Result<ContainerHandle>;

    /// Start a stopped container.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon refuses to start the container.
    async fn start_container(&self, id: &str) -> Result<()>;

    /// Stop a running container.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon refuses to stop the container.
    async fn stop_container(&self, id: &str) -> Result<()>;

    /// Remove a stopped container.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is still running or missing.
    async fn remove_container(&self, id: &str) -> Result<()>;

    /// Create and start a detached container, returning its fresh state.
    ///
    /// # Errors
    ///
    /// Returns the daemon's rejection verbatim: duplicate name, unknown
    /// image, or an already bound host port.
    async fn run_container(&self, spec: &RunSpec) -> Result<ContainerHandle>;
}
