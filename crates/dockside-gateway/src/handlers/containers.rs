//! Container endpoints.
//!
//! Each handler resolves the container by name through the lifecycle
//! manager. Transitions that have nothing to do answer `{"status": "failed"}`
//! with 200; only daemon failures produce a 500. Extractor rejections are
//! taken as `Result` so they leave through [`ApiError`] like everything else.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use dockside_lifecycle::{ContainerLifecycle, ContainerRecord, Filters, RunConfig};

use super::StatusResponse;
use crate::error::ApiError;
use crate::state::GatewayState;

/// Response for a successful run.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    /// Always `success`.
    pub status: &'static str,
    /// The container as it stands after starting.
    pub container: ContainerRecord,
}

/// List every container, stopped ones included.
///
/// ```text
/// GET /containers/
///
/// Response: 200 OK
/// [{ "name": "web", "status": "running", "image": "httpd:latest", ... }]
/// ```
pub async fn list_containers<L>(
    State(state): State<Arc<GatewayState<L>>>,
) -> Result<impl IntoResponse, ApiError>
where
    L: ContainerLifecycle + 'static,
{
    let records = state.lifecycle.list(true, &Filters::new()).await?;
    Ok(Json(records))
}

/// Create and start a container from a YAML or JSON run configuration.
///
/// ```text
/// POST /containers/
/// web:
///   properties:
///     image: httpd
///     ports:
///       - 8080: 80
///
/// Response: 201 Created
/// { "status": "success", "container": { "name": "web", ... } }
/// ```
pub async fn run_container<L>(
    State(state): State<Arc<GatewayState<L>>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    L: ContainerLifecycle + 'static,
{
    let config = RunConfig::parse(&body?)?;
    let container = state.lifecycle.run(&config).await?;

    Ok((
        StatusCode::CREATED,
        Json(RunResponse {
            status: "success",
            container,
        }),
    ))
}

/// Get a single container by exact name.
pub async fn get_container<L>(
    State(state): State<Arc<GatewayState<L>>>,
    name: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    L: ContainerLifecycle + 'static,
{
    let Path(name) = name?;
    let record = state
        .lifecycle
        .get_by_name(&name)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(record))
}

/// Start a stopped container.
pub async fn start_container<L>(
    State(state): State<Arc<GatewayState<L>>>,
    name: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    L: ContainerLifecycle + 'static,
{
    let Path(name) = name?;
    let started = state.lifecycle.start(&name).await?;
    Ok(Json(StatusResponse::from_outcome(started)))
}

/// Stop a running container.
pub async fn stop_container<L>(
    State(state): State<Arc<GatewayState<L>>>,
    name: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    L: ContainerLifecycle + 'static,
{
    let Path(name) = name?;
    let stopped = state.lifecycle.stop(&name).await?;
    Ok(Json(StatusResponse::from_outcome(stopped)))
}

/// Remove a container, stopping it first if needed.
pub async fn remove_container<L>(
    State(state): State<Arc<GatewayState<L>>>,
    name: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    L: ContainerLifecycle + 'static,
{
    let Path(name) = name?;
    let removed = state.lifecycle.remove(&name).await?;
    Ok(Json(StatusResponse::from_outcome(removed)))
}
