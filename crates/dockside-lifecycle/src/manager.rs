//! Lifecycle manager implementation.
//!
//! This module provides the `ContainerLifecycle` trait and the
//! `LifecycleManager` implementation that resolves containers by name and
//! applies guarded transitions through a [`DaemonClient`].

use std::sync::Arc;

use async_trait::async_trait;
use dockside_daemon::{name_filter, ContainerHandle, DaemonClient, DaemonError, Filters};

use crate::error::{LifecycleError, Result};
use crate::lifecycle;
use crate::record::{serialize, ContainerRecord};
use crate::run_config::RunConfig;

/// Trait defining the container lifecycle operations.
///
/// Every operation addresses containers by exact name and reads fresh state
/// from the daemon. Transitions on a container that is missing, or already in
/// the target state, return `false` instead of failing.
#[async_trait]
pub trait ContainerLifecycle: Send + Sync {
    /// List containers as records.
    ///
    /// With `include_stopped` false only running containers are returned.
    /// `filters` are passed to the daemon untouched.
    async fn list(&self, include_stopped: bool, filters: &Filters) -> Result<Vec<ContainerRecord>>;

    /// Look up a single container by exact name, stopped or not.
    async fn get_by_name(&self, name: &str) -> Result<Option<ContainerRecord>>;

    /// Create and start the first runnable container in `config`.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidConfig` if no entry has properties or
    /// the chosen entry is unusable, and `LifecycleError::Creation` carrying
    /// the daemon's message if the daemon refuses the container.
    async fn run(&self, config: &RunConfig) -> Result<ContainerRecord>;

    /// Start a stopped container. Returns `true` only if a start was issued.
    async fn start(&self, name: &str) -> Result<bool>;

    /// Stop a running container. Returns `true` only if a stop was issued.
    async fn stop(&self, name: &str) -> Result<bool>;

    /// Remove a container, stopping it first if it is running.
    ///
    /// Returns `true` only if the container existed and was removed.
    async fn remove(&self, name: &str) -> Result<bool>;
}

/// Implementation of [`ContainerLifecycle`] over any daemon client.
pub struct LifecycleManager<D: DaemonClient> {
    daemon: Arc<D>,
}

impl<D: DaemonClient> LifecycleManager<D> {
    /// Create a new lifecycle manager.
    pub const fn new(daemon: Arc<D>) -> Self {
        Self { daemon }
    }

    /// Look up the daemon-native handle of a container by exact name.
    ///
    /// The daemon's name filter matches substrings, so the result is narrowed
    /// to the container whose name is exactly `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon cannot be queried.
    pub async fn get_native_by_name(&self, name: &str) -> Result<Option<ContainerHandle>> {
        let containers = self
            .daemon
            .list_containers(true, &name_filter(name))
            .await?;

        Ok(containers.into_iter().find(|c| c.name == name))
    }
}

#[async_trait]
impl<D: DaemonClient + 'static> ContainerLifecycle for LifecycleManager<D> {
    async fn list(&self, include_stopped: bool, filters: &Filters) -> Result<Vec<ContainerRecord>> {
        let containers = self
            .daemon
            .list_containers(include_stopped, filters)
            .await?;

        tracing::debug!(
            include_stopped,
            count = containers.len(),
            "Listed containers"
        );

        Ok(containers.iter().map(serialize).collect())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<ContainerRecord>> {
        Ok(self
            .get_native_by_name(name)
            .await?
            .as_ref()
            .map(serialize))
    }

    async fn run(&self, config: &RunConfig) -> Result<ContainerRecord> {
        let mut runnable = config.runnable();
        let (name, params) = runnable.next().ok_or_else(|| {
            LifecycleError::InvalidConfig("no container with properties to run".to_string())
        })?;

        let skipped = runnable.count();
        if skipped > 0 {
            tracing::warn!(name = %name, skipped, "Ignoring additional containers in run request");
        }

        let spec = params.to_spec(name)?;

        tracing::info!(
            name = %spec.name,
            image = %spec.image,
            ports = spec.ports.len(),
            "Running container"
        );

        let handle = self
            .daemon
            .run_container(&spec)
            .await
            .map_err(|source| LifecycleError::Creation {
                name: spec.name.clone(),
                source,
            })?;

        tracing::info!(name = %handle.name, id = %handle.id, "Container running");

        Ok(serialize(&handle))
    }

    async fn start(&self, name: &str) -> Result<bool> {
        let Some(container) = self.get_native_by_name(name).await? else {
            tracing::debug!(name = %name, "Start skipped: no such container");
            return Ok(false);
        };

        if !lifecycle::can_start(&container) {
            tracing::debug!(name = %name, "Start skipped: already running");
            return Ok(false);
        }

        tracing::info!(name = %name, id = %container.id, "Starting container");

        match self.daemon.start_container(&container.id).await {
            Ok(()) => Ok(true),
            Err(err) if lost_race(&err) => {
                tracing::debug!(name = %name, error = %err, "Container changed before start");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn stop(&self, name: &str) -> Result<bool> {
        let Some(container) = self.get_native_by_name(name).await? else {
            tracing::debug!(name = %name, "Stop skipped: no such container");
            return Ok(false);
        };

        if !lifecycle::can_stop(&container) {
            tracing::debug!(name = %name, "Stop skipped: not running");
            return Ok(false);
        }

        tracing::info!(name = %name, id = %container.id, "Stopping container");

        match self.daemon.stop_container(&container.id).await {
            Ok(()) => Ok(true),
            Err(err) if lost_race(&err) => {
                tracing::debug!(name = %name, error = %err, "Container changed before stop");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        let Some(container) = self.get_native_by_name(name).await? else {
            tracing::debug!(name = %name, "Remove skipped: no such container");
            return Ok(false);
        };

        if lifecycle::must_stop_before_remove(&container) {
            tracing::info!(name = %name, id = %container.id, "Stopping container before removal");

            match self.daemon.stop_container(&container.id).await {
                Ok(()) => {}
                // Stopped by someone else in the meantime.
                Err(err) if err.is_not_modified() => {}
                Err(err) if err.is_not_found() => return Ok(false),
                Err(err) => return Err(err.into()),
            }
        }

        tracing::info!(name = %name, id = %container.id, "Removing container");

        match self.daemon.remove_container(&container.id).await {
            Ok(()) => Ok(true),
            Err(err) if err.is_not_found() => {
                tracing::debug!(name = %name, "Container vanished before removal");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// The container was removed or changed state between lookup and mutation.
const fn lost_race(err: &DaemonError) -> bool {
    err.is_not_found() || err.is_not_modified()
}
