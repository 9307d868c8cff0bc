//! Container transition guards.
//!
//! Each mutating operation first looks the container up and consults one of
//! these guards. A guard that says no turns the operation into a no-op that
//! reports `false` without touching the daemon.
//!
//! # State Machine
//!
//! ```text
//!          run
//!   ───────────────▶ ┌──────────┐
//!                    │ Running  │◄────────┐
//!                    └────┬─────┘         │
//!                         │ (stop)        │ (start)
//!                         ▼               │
//!                    ┌──────────┐         │
//!                    │ Stopped  │─────────┘
//!                    └────┬─────┘
//!                         │ (remove)
//!                         ▼
//!                    ┌──────────┐
//!                    │  Absent  │
//!                    └──────────┘
//! ```
//!
//! `remove` on a running container passes through `Stopped` first.

use dockside_daemon::ContainerHandle;

/// Returns true if `start` should ask the daemon to start this container.
#[must_use]
pub const fn can_start(container: &ContainerHandle) -> bool {
    !container.is_running()
}

/// Returns true if `stop` should ask the daemon to stop this container.
#[must_use]
pub const fn can_stop(container: &ContainerHandle) -> bool {
    container.is_running()
}

/// Returns true if the container has to be stopped before it can be removed.
#[must_use]
pub const fn must_stop_before_remove(container: &ContainerHandle) -> bool {
    container.is_running()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(running: bool) -> ContainerHandle {
        ContainerHandle {
            id: "abc".to_string(),
            name: "web".to_string(),
            status: if running { "running" } else { "exited" }.to_string(),
            running,
            ..Default::default()
        }
    }

    #[test]
    fn running_container_can_only_stop() {
        let running = container(true);
        assert!(!can_start(&running));
        assert!(can_stop(&running));
        assert!(must_stop_before_remove(&running));
    }

    #[test]
    fn stopped_container_can_only_start() {
        let stopped = container(false);
        assert!(can_start(&stopped));
        assert!(!can_stop(&stopped));
        assert!(!must_stop_before_remove(&stopped));
    }

    #[test]
    fn created_container_counts_as_stopped() {
        let mut created = container(false);
        created.status = "created".to_string();
        assert!(can_start(&created));
        assert!(!can_stop(&created));
    }
}
