//! HTTP gateway for dockside.
//!
//! This crate exposes the container lifecycle operations over a small JSON
//! API. It handles:
//!
//! - Routing with an explicit per-route method table
//! - Path normalization (trailing and duplicate slashes)
//! - Translating lifecycle outcomes into status bodies and HTTP codes
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Clients                              │
//! │                         (HTTP)                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    dockside-gateway                         │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐   │
//! │  │   Path      │ │   Router    │ │    Error            │   │
//! │  │  Normalizer │ │  + Handlers │ │    Responses        │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                     ┌──────────────────┐
//!                     │ LifecycleManager │
//!                     └──────────────────┘
//!                              │
//!                              ▼
//!                       ┌────────────┐
//!                       │   Daemon   │
//!                       └────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use axum::extract::Request;
//! use axum::ServiceExt;
//! use dockside_daemon::{DaemonConfig, DockerDaemon};
//! use dockside_gateway::{create_app, GatewayConfig, GatewayState};
//! use dockside_lifecycle::LifecycleManager;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let daemon = Arc::new(DockerDaemon::connect(&DaemonConfig::default())?);
//! let lifecycle = Arc::new(LifecycleManager::new(daemon));
//!
//! let state = GatewayState::new(lifecycle, GatewayConfig::default());
//! let app = create_app(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod normalize;
pub mod routes;
pub mod state;

pub use config::GatewayConfig;
pub use error::ApiError;
pub use routes::{create_app, create_router};
pub use state::GatewayState;
