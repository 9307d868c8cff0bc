//! Container-runtime daemon client for dockside.
//!
//! This crate provides the [`DaemonClient`] trait and the [`DockerDaemon`]
//! implementation that talks to a Docker Engine over its local socket. It
//! handles:
//!
//! - Listing containers, resolving each match into a full [`ContainerHandle`]
//! - Inspecting a single container
//! - Start, stop and remove by container id
//! - Create-and-start of a detached container from a [`RunSpec`]
//!
//! The client holds no state of its own. Every call is one round trip to the
//! daemon, which stays the single source of truth.
//!
//! # Example
//!
//! ```no_run
//! use dockside_daemon::{name_filter, DaemonClient, DaemonConfig, DockerDaemon};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let daemon = DockerDaemon::connect(&DaemonConfig::default())?;
//! daemon.ping().await?;
//!
//! for handle in daemon.list_containers(true, &name_filter("web")).await? {
//!     println!("{} is {}", handle.name, handle.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Testing
//!
//! Enable the `test-utils` feature to get [`MockDaemon`], an in-memory daemon
//! that reproduces substring name filtering, name and port conflicts, and
//! records every mutating call.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod docker;
pub mod error;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use client::DaemonClient;
pub use config::DaemonConfig;
pub use docker::DockerDaemon;
pub use error::{DaemonError, Result};
pub use types::{name_filter, ContainerHandle, Filters, HostBinding, RunSpec};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{DaemonCall, MockDaemon};
