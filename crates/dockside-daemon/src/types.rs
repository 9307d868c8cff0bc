//! Daemon-side container types.

use std::collections::{BTreeMap, HashMap};

/// Daemon list filters, e.g. `{"name": ["web"]}`.
pub type Filters = HashMap<String, Vec<String>>;

/// Build a filter matching containers by name.
///
/// The daemon matches names by substring, so callers needing exact matches
/// must re-check the returned names.
#[must_use]
pub fn name_filter(name: &str) -> Filters {
    let mut filters = Filters::new();
    filters.insert("name".to_string(), vec![name.to_string()]);
    filters
}

/// One host binding of a published container port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostBinding {
    /// Host interface, if the daemon reports one.
    pub host_ip: Option<String>,
    /// Host port, as a string.
    pub host_port: Option<String>,
}

/// The daemon's full view of one container at the time of the call.
///
/// This is the handle lifecycle operations act upon; it is never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerHandle {
    /// Daemon-assigned container id.
    pub id: String,
    /// Container name without the daemon's leading `/`.
    pub name: String,
    /// Daemon status string (`created`, `running`, `exited`, ...).
    pub status: String,
    /// Whether the daemon reports the container as running.
    pub running: bool,
    /// Repo tags of the image the container was created from, oldest first.
    pub image_tags: Vec<String>,
    /// Creation timestamp as reported by the daemon.
    pub created: Option<String>,
    /// Last start timestamp as reported by the daemon.
    pub started_at: Option<String>,
    /// Configured port bindings keyed by `port/protocol`.
    pub port_bindings: BTreeMap<String, Vec<HostBinding>>,
}

impl ContainerHandle {
    /// Returns true if the daemon reports the container as running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }
}

/// Parameters for creating and starting a detached container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSpec {
    /// Container name.
    pub name: String,
    /// Fully tagged image reference.
    pub image: String,
    /// Container port (`80/tcp`) to host port.
    pub ports: BTreeMap<String, String>,
    /// Arguments passed to the image entrypoint.
    pub command: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_filter_shape() {
        let filters = name_filter("web");
        assert_eq!(filters.len(), 1);
        assert_eq!(filters["name"], vec!["web".to_string()]);
    }
}
