//! Container lifecycle management for dockside.
//!
//! This crate is the core of the service. It translates daemon-native
//! container state into a stable wire record and guards every state
//! transition before delegating to the daemon.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Gateway (HTTP)                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     LifecycleManager                        │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐   │
//! │  │  Record     │ │  Lookup     │ │  Guarded            │   │
//! │  │  Projection │ │  by Name    │ │  Transitions        │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                       ┌────────────┐
//!                       │   Daemon   │
//!                       └────────────┘
//! ```
//!
//! Nothing is cached. Every operation re-reads the daemon, so a returned
//! [`ContainerRecord`] is stale as soon as it is handed out.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use dockside_daemon::{DaemonConfig, DockerDaemon};
//! use dockside_lifecycle::{ContainerLifecycle, LifecycleManager, RunConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let daemon = Arc::new(DockerDaemon::connect(&DaemonConfig::default())?);
//! let manager = LifecycleManager::new(daemon);
//!
//! let config = RunConfig::parse(b"web:\n  properties:\n    image: httpd\n    ports:\n      - 8080: 80\n")?;
//! let record = manager.run(&config).await?;
//! assert_eq!(record.image.as_deref(), Some("httpd:latest"));
//!
//! assert!(manager.stop("web").await?);
//! assert!(!manager.stop("web").await?);
//! # Ok(())
//! # }
//! ```
//!
//! # State Machine
//!
//! - `start`: stopped → running (no-op if running or absent)
//! - `stop`: running → stopped (no-op if stopped or absent)
//! - `remove`: running or stopped → absent (stops first if running)
//! - `run`: absent → running
//!
//! See the [`lifecycle`] module for the transition guards.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod lifecycle;
pub mod manager;
pub mod record;
pub mod run_config;

pub use error::{LifecycleError, Result};
pub use manager::{ContainerLifecycle, LifecycleManager};
pub use record::{serialize, ContainerRecord};
pub use run_config::{normalize_image, Command, PortMapping, RunConfig, RunEntry, RunParams};

// Re-export commonly used types from the daemon crate for convenience
pub use dockside_daemon::{name_filter, ContainerHandle, DaemonClient, DaemonError, Filters};
