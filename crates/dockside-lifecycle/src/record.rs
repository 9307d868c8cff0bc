//! The caller-facing container record.
//!
//! A [`ContainerRecord`] is a pure projection of a [`ContainerHandle`]. It has
//! no identity of its own and is recomputed on every read.

use std::collections::BTreeMap;

use dockside_daemon::ContainerHandle;
use serde::{Deserialize, Serialize};

/// Timestamp prefix the daemon reports for containers that never started.
const ZERO_TIME_PREFIX: &str = "0001-01-01";

/// Serialized snapshot of one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// Container name.
    pub name: String,
    /// Daemon status string.
    pub status: String,
    /// Most recently applied tag of the container's image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last start timestamp; absent if the container never started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    /// Container port (no protocol suffix) to host port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<BTreeMap<String, String>>,
}

/// Project a daemon handle onto a [`ContainerRecord`].
///
/// Never fails: daemon fields that are missing become absent record fields.
#[must_use]
pub fn serialize(handle: &ContainerHandle) -> ContainerRecord {
    ContainerRecord {
        name: handle.name.clone(),
        status: handle.status.clone(),
        image: handle.image_tags.last().cloned(),
        created_at: handle.created.clone().filter(|created| !created.is_empty()),
        started_at: handle
            .started_at
            .clone()
            .filter(|started| !started.is_empty() && !started.starts_with(ZERO_TIME_PREFIX)),
        ports: published_ports(handle),
    }
}

impl From<&ContainerHandle> for ContainerRecord {
    fn from(handle: &ContainerHandle) -> Self {
        serialize(handle)
    }
}

/// First host port bound to each container port, keyed without protocol.
///
/// When two protocols share a port number the first key in sort order wins,
/// so `53/tcp` shadows `53/udp`.
fn published_ports(handle: &ContainerHandle) -> Option<BTreeMap<String, String>> {
    let mut ports = BTreeMap::new();

    for (container_port, bindings) in &handle.port_bindings {
        let Some(host_port) = bindings.iter().find_map(|b| b.host_port.clone()) else {
            continue;
        };
        ports
            .entry(strip_protocol(container_port).to_string())
            .or_insert(host_port);
    }

    if ports.is_empty() {
        None
    } else {
        Some(ports)
    }
}

fn strip_protocol(port: &str) -> &str {
    port.split_once('/').map_or(port, |(number, _)| number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockside_daemon::HostBinding;

    fn binding(host_port: &str) -> HostBinding {
        HostBinding {
            host_ip: Some("0.0.0.0".to_string()),
            host_port: Some(host_port.to_string()),
        }
    }

    fn handle() -> ContainerHandle {
        let mut port_bindings = BTreeMap::new();
        port_bindings.insert("80/tcp".to_string(), vec![binding("8080"), binding("8081")]);
        port_bindings.insert("53/udp".to_string(), vec![binding("5353")]);

        ContainerHandle {
            id: "abc".to_string(),
            name: "web".to_string(),
            status: "running".to_string(),
            running: true,
            image_tags: vec!["httpd:2.4".to_string(), "httpd:latest".to_string()],
            created: Some("2024-05-01T10:00:00Z".to_string()),
            started_at: Some("2024-05-01T10:00:01Z".to_string()),
            port_bindings,
        }
    }

    #[test]
    fn projects_handle() {
        let record = serialize(&handle());

        assert_eq!(record.name, "web");
        assert_eq!(record.status, "running");
        assert_eq!(record.image.as_deref(), Some("httpd:latest"));
        assert_eq!(record.created_at.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(record.started_at.as_deref(), Some("2024-05-01T10:00:01Z"));
    }

    #[test]
    fn ports_drop_protocol_and_keep_first_binding() {
        let ports = serialize(&handle()).ports.unwrap();

        assert_eq!(ports.len(), 2);
        assert_eq!(ports["80"], "8080");
        assert_eq!(ports["53"], "5353");
        assert!(ports.keys().all(|key| !key.contains('/')));
    }

    #[test]
    fn tcp_wins_over_udp_on_same_port() {
        let mut handle = handle();
        handle.port_bindings.clear();
        handle
            .port_bindings
            .insert("53/udp".to_string(), vec![binding("1053")]);
        handle
            .port_bindings
            .insert("53/tcp".to_string(), vec![binding("2053")]);

        let ports = serialize(&handle).ports.unwrap();
        assert_eq!(ports["53"], "2053");
    }

    #[test]
    fn absent_fields_are_omitted() {
        let handle = ContainerHandle {
            id: "abc".to_string(),
            name: "idle".to_string(),
            status: "created".to_string(),
            started_at: Some("0001-01-01T00:00:00Z".to_string()),
            ..Default::default()
        };
        let record = serialize(&handle);

        assert!(record.image.is_none());
        assert!(record.started_at.is_none());
        assert!(record.ports.is_none());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "idle", "status": "created" })
        );
    }

    #[test]
    fn unbound_ports_are_not_published() {
        let mut handle = handle();
        handle.port_bindings.clear();
        handle.port_bindings.insert("443/tcp".to_string(), Vec::new());

        assert!(serialize(&handle).ports.is_none());
    }
}
