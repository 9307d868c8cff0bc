//! In-memory daemon for tests.
//!
//! Reproduces the daemon behaviors the lifecycle logic depends on: substring
//! name filtering, refusing to remove running containers, and rejecting
//! duplicate names, unknown images and already bound host ports.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::client::DaemonClient;
use crate::error::{DaemonError, Result};
use crate::types::{ContainerHandle, Filters, HostBinding, RunSpec};

const CREATED_AT: &str = "2024-01-01T00:00:00.000000000Z";
const STARTED_AT: &str = "2024-01-01T00:00:01.000000000Z";
const NEVER_STARTED: &str = "0001-01-01T00:00:00Z";

/// A mutating call the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonCall {
    /// `start_container` with the container id.
    Start(String),
    /// `stop_container` with the container id.
    Stop(String),
    /// `remove_container` with the container id.
    Remove(String),
    /// `run_container` with the requested spec.
    Run(RunSpec),
}

#[derive(Default)]
struct MockState {
    containers: Vec<ContainerHandle>,
    calls: Vec<DaemonCall>,
    images: Option<BTreeSet<String>>,
    next_id: u64,
    unreachable: bool,
}

impl MockState {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:064x}", self.next_id)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.containers
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DaemonError::NotFound(format!("No such container: {id}")))
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(DaemonError::Docker(bollard::errors::Error::IOError {
                err: std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "daemon unreachable",
                ),
            }));
        }
        Ok(())
    }

    fn host_port_in_use(&self, host_port: &str) -> bool {
        self.containers
            .iter()
            .filter(|c| c.running)
            .flat_map(|c| c.port_bindings.values().flatten())
            .any(|binding| binding.host_port.as_deref() == Some(host_port))
    }
}

/// A daemon that keeps containers in memory.
#[derive(Default)]
pub struct MockDaemon {
    state: Mutex<MockState>,
}

impl MockDaemon {
    /// Create an empty mock daemon that accepts any image.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict runnable images to the given references.
    #[must_use]
    pub fn with_images<I, S>(self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.lock().images = Some(images.into_iter().map(Into::into).collect());
        self
    }

    /// Seed a container and return its id.
    pub fn add_container(&self, name: &str, image: &str, running: bool) -> String {
        let mut state = self.state.lock();
        let id = state.allocate_id();
        let (status, started_at) = if running {
            ("running", STARTED_AT)
        } else {
            ("created", NEVER_STARTED)
        };

        state.containers.push(ContainerHandle {
            id: id.clone(),
            name: name.to_string(),
            status: status.to_string(),
            running,
            image_tags: vec![image.to_string()],
            created: Some(CREATED_AT.to_string()),
            started_at: Some(started_at.to_string()),
            port_bindings: BTreeMap::new(),
        });

        id
    }

    /// Make every subsequent call fail as if the daemon were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    /// Every mutating call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<DaemonCall> {
        self.state.lock().calls.clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Number of containers the daemon knows about.
    #[must_use]
    pub fn container_count(&self) -> usize {
        self.state.lock().containers.len()
    }

    /// Look up a container by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ContainerHandle> {
        self.state
            .lock()
            .containers
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }
}

fn matches_filters(handle: &ContainerHandle, filters: &Filters) -> bool {
    filters.iter().all(|(key, values)| match key.as_str() {
        "name" => values.iter().any(|v| handle.name.contains(v.as_str())),
        "status" => values.iter().any(|v| handle.status == *v),
        "id" => values.iter().any(|v| handle.id.starts_with(v.as_str())),
        _ => true,
    })
}

#[async_trait]
impl DaemonClient for MockDaemon {
    async fn ping(&self) -> Result<()> {
        self.state.lock().check_reachable()
    }

    async fn list_containers(&self, all: bool, filters: &Filters) -> Result<Vec<ContainerHandle>> {
        let state = self.state.lock();
        state.check_reachable()?;

        Ok(state
            .containers
            .iter()
            .filter(|c| all || c.running)
            .filter(|c| matches_filters(c, filters))
            .cloned()
            .collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerHandle> {
        let state = self.state.lock();
        state.check_reachable()?;
        let index = state.position(id)?;
        Ok(state.containers[index].clone())
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.check_reachable()?;
        state.calls.push(DaemonCall::Start(id.to_string()));

        let index = state.position(id)?;
        let container = &mut state.containers[index];
        container.running = true;
        container.status = "running".to_string();
        container.started_at = Some(STARTED_AT.to_string());
        Ok(())
    }

    async fn stop_container(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.check_reachable()?;
        state.calls.push(DaemonCall::Stop(id.to_string()));

        let index = state.position(id)?;
        let container = &mut state.containers[index];
        container.running = false;
        container.status = "exited".to_string();
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.check_reachable()?;
        state.calls.push(DaemonCall::Remove(id.to_string()));

        let index = state.position(id)?;
        if state.containers[index].running {
            return Err(DaemonError::Conflict(format!(
                "You cannot remove a running container {id}. Stop the container before attempting removal or force remove"
            )));
        }
        state.containers.remove(index);
        Ok(())
    }

    async fn run_container(&self, spec: &RunSpec) -> Result<ContainerHandle> {
        let mut state = self.state.lock();
        state.check_reachable()?;
        state.calls.push(DaemonCall::Run(spec.clone()));

        if state.containers.iter().any(|c| c.name == spec.name) {
            return Err(DaemonError::Conflict(format!(
                "Conflict. The container name \"/{}\" is already in use",
                spec.name
            )));
        }

        if let Some(images) = &state.images {
            if !images.contains(&spec.image) {
                return Err(DaemonError::NotFound(format!(
                    "No such image: {}",
                    spec.image
                )));
            }
        }

        if let Some(host_port) = spec
            .ports
            .values()
            .find(|host_port| state.host_port_in_use(host_port))
        {
            return Err(DaemonError::Server {
                status_code: 500,
                message: format!(
                    "driver failed programming external connectivity: Bind for 0.0.0.0:{host_port} failed: port is already allocated"
                ),
            });
        }

        let port_bindings = spec
            .ports
            .iter()
            .map(|(container_port, host_port)| {
                let binding = HostBinding {
                    host_ip: Some(String::new()),
                    host_port: Some(host_port.clone()),
                };
                (container_port.clone(), vec![binding])
            })
            .collect();

        let handle = ContainerHandle {
            id: state.allocate_id(),
            name: spec.name.clone(),
            status: "running".to_string(),
            running: true,
            image_tags: vec![spec.image.clone()],
            created: Some(CREATED_AT.to_string()),
            started_at: Some(STARTED_AT.to_string()),
            port_bindings,
        };

        state.containers.push(handle.clone());
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::name_filter;

    #[tokio::test]
    async fn name_filter_matches_substrings() {
        let daemon = MockDaemon::new();
        daemon.add_container("web", "httpd:latest", true);
        daemon.add_container("webapp", "httpd:latest", false);

        let running = daemon.list_containers(false, &name_filter("we")).await.unwrap();
        assert_eq!(running.len(), 1);

        let all = daemon.list_containers(true, &name_filter("we")).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn refuses_to_remove_running() {
        let daemon = MockDaemon::new();
        let id = daemon.add_container("web", "httpd:latest", true);

        let result = daemon.remove_container(&id).await;
        assert!(matches!(result, Err(DaemonError::Conflict(_))));
        assert_eq!(daemon.container_count(), 1);
    }

    #[tokio::test]
    async fn run_rejects_duplicates_and_unknown_images() {
        let daemon = MockDaemon::new().with_images(["httpd:latest"]);
        daemon.add_container("web", "httpd:latest", true);

        let duplicate = RunSpec {
            name: "web".to_string(),
            image: "httpd:latest".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            daemon.run_container(&duplicate).await,
            Err(DaemonError::Conflict(_))
        ));

        let unknown = RunSpec {
            name: "db".to_string(),
            image: "postgres:latest".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            daemon.run_container(&unknown).await,
            Err(DaemonError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn run_rejects_bound_host_port() {
        let daemon = MockDaemon::new();
        let mut ports = BTreeMap::new();
        ports.insert("80/tcp".to_string(), "8080".to_string());

        let first = RunSpec {
            name: "one".to_string(),
            image: "httpd:latest".to_string(),
            ports: ports.clone(),
            command: None,
        };
        daemon.run_container(&first).await.unwrap();

        let second = RunSpec {
            name: "two".to_string(),
            ..first
        };
        let err = daemon.run_container(&second).await.unwrap_err();
        assert!(err.to_string().contains("port is already allocated"));
    }

    #[tokio::test]
    async fn unreachable_daemon_fails_every_call() {
        let daemon = MockDaemon::new();
        daemon.set_unreachable(true);

        assert!(daemon.ping().await.is_err());
        assert!(daemon
            .list_containers(true, &Filters::new())
            .await
            .unwrap_err()
            .is_retriable());
    }
}
