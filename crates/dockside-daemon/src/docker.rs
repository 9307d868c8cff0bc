//! Docker Engine implementation of [`DaemonClient`].
//!
//! Talks to the local daemon through bollard. Connection parameters come from
//! the environment (`DOCKER_HOST`) or the platform default socket.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, ListContainersOptions,
    RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::models::{ContainerInspectResponse, HostConfig, PortBinding, PortMap};
use bollard::Docker;
use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::client::DaemonClient;
use crate::config::DaemonConfig;
use crate::error::{DaemonError, Result};
use crate::types::{ContainerHandle, Filters, HostBinding, RunSpec};

type ExposedPorts = HashMap<String, HashMap<(), ()>>;

/// Daemon client backed by a bollard [`Docker`] connection.
///
/// The connection is created once and shared; bollard clones are cheap
/// handles onto the same connection pool.
#[derive(Debug, Clone)]
pub struct DockerDaemon {
    docker: Docker,
    config: DaemonConfig,
}

impl DockerDaemon {
    /// Connect to the local daemon using platform defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection parameters are invalid. This does
    /// not contact the daemon; call [`DaemonClient::ping`] for that.
    pub fn connect(config: &DaemonConfig) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()?.with_timeout(config.timeout());
        Ok(Self::with_docker(docker, config.clone()))
    }

    /// Wrap an existing bollard connection.
    #[must_use]
    pub fn with_docker(docker: Docker, config: DaemonConfig) -> Self {
        Self { docker, config }
    }

    /// Repo tags of an image, or none if the image is gone.
    async fn image_tags(&self, image_id: Option<&str>) -> Result<Vec<String>> {
        let Some(image_id) = image_id else {
            return Ok(Vec::new());
        };

        match self.docker.inspect_image(image_id).await.map_err(DaemonError::from) {
            Ok(image) => Ok(image.repo_tags.unwrap_or_default()),
            Err(err) if err.is_not_found() => {
                debug!(image_id = %image_id, "Image no longer present");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Inspect a container, treating one that vanished mid-listing as absent.
    async fn inspect_if_present(&self, id: &str) -> Result<Option<ContainerHandle>> {
        match self.inspect_container(id).await {
            Ok(handle) => Ok(Some(handle)),
            Err(err) if err.is_not_found() => {
                debug!(container_id = %id, "Container disappeared while listing");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Best-effort removal of a container whose start failed during `run`.
    async fn discard(&self, id: &str) {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };

        if let Err(err) = self.docker.remove_container(id, Some(options)).await {
            warn!(container_id = %id, error = %err, "Failed to discard unstarted container");
        }
    }
}

#[async_trait]
impl DaemonClient for DockerDaemon {
    async fn ping(&self) -> Result<()> {
        self.docker.ping().await?;
        Ok(())
    }

    async fn list_containers(&self, all: bool, filters: &Filters) -> Result<Vec<ContainerHandle>> {
        let options = ListContainersOptions::<String> {
            all,
            filters: filters.clone(),
            ..Default::default()
        };

        let summaries = self.docker.list_containers(Some(options)).await?;

        let handles = try_join_all(
            summaries
                .into_iter()
                .filter_map(|summary| summary.id)
                .map(|id| async move { self.inspect_if_present(&id).await }),
        )
        .await?;

        Ok(handles.into_iter().flatten().collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerHandle> {
        let info = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;
        let image_tags = self.image_tags(info.image.as_deref()).await?;
        handle_from_inspect(info, image_tags)
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await?;
        Ok(())
    }

    async fn stop_container(&self, id: &str) -> Result<()> {
        let options = StopContainerOptions {
            t: self.config.stop_timeout_seconds,
        };
        self.docker.stop_container(id, Some(options)).await?;
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        self.docker
            .remove_container(id, None::<RemoveContainerOptions>)
            .await?;
        Ok(())
    }

    async fn run_container(&self, spec: &RunSpec) -> Result<ContainerHandle> {
        let (exposed_ports, port_bindings) = published_ports(&spec.ports);

        let config = Config::<String> {
            image: Some(spec.image.clone()),
            cmd: spec.command.clone(),
            exposed_ports,
            host_config: Some(HostConfig {
                port_bindings,
                ..Default::default()
            }),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };

        let created = self.docker.create_container(Some(options), config).await?;
        debug!(name = %spec.name, container_id = %created.id, "Created container");

        if let Err(err) = self
            .docker
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await
        {
            warn!(name = %spec.name, error = %err, "Container failed to start");
            self.discard(&created.id).await;
            return Err(err.into());
        }

        self.inspect_container(&created.id).await
    }
}

/// Project an inspect response onto a [`ContainerHandle`].
fn handle_from_inspect(
    info: ContainerInspectResponse,
    image_tags: Vec<String>,
) -> Result<ContainerHandle> {
    let id = info
        .id
        .ok_or_else(|| DaemonError::Malformed("container without an id".to_string()))?;

    let name = info
        .name
        .map(|name| name.trim_start_matches('/').to_string())
        .unwrap_or_default();

    let state = info.state.unwrap_or_default();

    let port_bindings = info
        .host_config
        .and_then(|host_config| host_config.port_bindings)
        .unwrap_or_default()
        .into_iter()
        .map(|(port, bindings)| {
            let bindings = bindings
                .unwrap_or_default()
                .into_iter()
                .map(|binding| HostBinding {
                    host_ip: binding.host_ip,
                    host_port: binding.host_port,
                })
                .collect();
            (port, bindings)
        })
        .collect::<BTreeMap<_, _>>();

    Ok(ContainerHandle {
        id,
        name,
        status: state.status.map(|status| status.to_string()).unwrap_or_default(),
        running: state.running.unwrap_or(false),
        image_tags,
        created: info.created,
        started_at: state.started_at,
        port_bindings,
    })
}

/// Build the exposed-port set and host bindings for a run.
fn published_ports(ports: &BTreeMap<String, String>) -> (Option<ExposedPorts>, Option<PortMap>) {
    if ports.is_empty() {
        return (None, None);
    }

    let (exposed, bindings): (ExposedPorts, PortMap) = ports
        .iter()
        .map(|(container_port, host_port)| {
            let binding = PortBinding {
                host_ip: None,
                host_port: Some(host_port.clone()),
            };
            (
                (container_port.clone(), HashMap::new()),
                (container_port.clone(), Some(vec![binding])),
            )
        })
        .unzip();

    (Some(exposed), Some(bindings))
}
