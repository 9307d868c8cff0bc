//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use dockside_lifecycle::ContainerLifecycle;

use crate::handlers::{containers, fallback, index};
use crate::normalize::{normalize_paths, Normalized};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// Every path is registered with a trailing slash; use [`create_app`] to
/// get a service that also accepts paths without one.
///
/// # Routes
///
/// - `GET /` - Gateway status
/// - `GET /containers/` - List containers
/// - `POST /containers/` - Run a container
/// - `GET /containers/:name/` - Get container
/// - `POST /containers/:name/start/` - Start container
/// - `POST /containers/:name/stop/` - Stop container
/// - `POST /containers/:name/remove/` - Remove container
///
/// Any other method on these paths gets a 405 listing the allowed methods;
/// any other path gets a 404.
pub fn create_router<L>(state: GatewayState<L>) -> Router
where
    L: ContainerLifecycle + 'static,
{
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        .route("/", get(index::index).fallback(fallback::get_only))
        .route(
            "/containers/",
            get(containers::list_containers::<L>)
                .post(containers::run_container::<L>)
                .fallback(fallback::get_or_post),
        )
        .route(
            "/containers/:name/",
            get(containers::get_container::<L>).fallback(fallback::get_only),
        )
        .route(
            "/containers/:name/start/",
            post(containers::start_container::<L>).fallback(fallback::post_only),
        )
        .route(
            "/containers/:name/stop/",
            post(containers::stop_container::<L>).fallback(fallback::post_only),
        )
        .route(
            "/containers/:name/remove/",
            post(containers::remove_container::<L>).fallback(fallback::post_only),
        )
        .fallback(fallback::not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Create the router wrapped in path normalization, ready to serve.
pub fn create_app<L>(state: GatewayState<L>) -> Normalized<Router>
where
    L: ContainerLifecycle + 'static,
{
    normalize_paths(create_router(state))
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
    use dockside_daemon::MockDaemon;
    use dockside_lifecycle::LifecycleManager;
    use tower::ServiceExt;

    use crate::config::GatewayConfig;

    fn router(cors_origins: &[&str]) -> Router {
        let daemon = Arc::new(MockDaemon::new());
        let lifecycle = Arc::new(LifecycleManager::new(daemon));
        let config = GatewayConfig {
            cors_origins: cors_origins.iter().map(ToString::to_string).collect(),
            ..Default::default()
        };
        create_router(GatewayState::new(lifecycle, config))
    }

    async fn allowed_origin(router: Router, origin: &str) -> Option<HeaderValue> {
        let request = Request::builder()
            .uri("/")
            .header(ORIGIN, origin)
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).cloned()
    }

    #[tokio::test]
    async fn cors_any_origin() {
        let allowed = allowed_origin(router(&["*"]), "https://app.example.com").await;
        assert_eq!(allowed, Some(HeaderValue::from_static("*")));
    }

    #[tokio::test]
    async fn cors_specific_origins() {
        let origins = ["http://localhost:3000", "not a header\nvalue"];

        let allowed = allowed_origin(router(&origins), "http://localhost:3000").await;
        assert_eq!(
            allowed,
            Some(HeaderValue::from_static("http://localhost:3000"))
        );

        let denied = allowed_origin(router(&origins), "https://evil.example.com").await;
        assert!(denied.is_none());
    }
}
