//! API error types and responses.
//!
//! Every failure leaves the gateway as one of three JSON shapes:
//!
//! - `404 {"error": "not_found"}`
//! - `405 {"error": "method not allowed", "allowed_methods": [...]}`
//! - `500 {"status": "failed", "error": "<message>"}`
//!
//! Requests rejected before reaching a handler (oversized body, undecodable
//! path) use the `failed` shape with the rejection's own status code.

use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use dockside_lifecycle::LifecycleError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested container or route does not exist.
    #[error("not_found")]
    NotFound,

    /// The route exists but does not accept this method.
    #[error("method not allowed")]
    MethodNotAllowed(&'static [&'static str]),

    /// The operation failed; the message is passed through to the caller.
    #[error("{0}")]
    Failed(String),

    /// The request could not be extracted.
    #[error("{message}")]
    Rejected {
        /// Status chosen by the extractor (e.g. 400, 413).
        status: StatusCode,
        /// The extractor's explanation.
        message: String,
    },
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::NotFound => json!({ "error": "not_found" }),
            Self::MethodNotAllowed(allowed) => json!({
                "error": self.to_string(),
                "allowed_methods": allowed,
            }),
            Self::Failed(message) | Self::Rejected { message, .. } => json!({
                "status": "failed",
                "error": message,
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        if err.is_invalid_input() {
            tracing::warn!(error = %err, "Rejected request");
        } else {
            tracing::error!(error = %err, "Lifecycle operation failed");
        }
        Self::Failed(err.to_string())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        tracing::warn!(error = %rejection, "Rejected request body");
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::warn!(error = %rejection, "Rejected request path");
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use dockside_lifecycle::DaemonError;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn error_status_codes() {
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed(&["GET"]).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::Failed("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn error_bodies() {
        let (status, body) = body_json(ApiError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "not_found" }));

        let (_, body) = body_json(ApiError::MethodNotAllowed(&["GET", "POST"])).await;
        assert_eq!(
            body,
            json!({ "error": "method not allowed", "allowed_methods": ["GET", "POST"] })
        );

        let (_, body) = body_json(ApiError::Failed("boom".into())).await;
        assert_eq!(body, json!({ "status": "failed", "error": "boom" }));

        let (status, body) = body_json(ApiError::Rejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".into(),
        })
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body,
            json!({ "status": "failed", "error": "length limit exceeded" })
        );
    }

    #[test]
    fn daemon_message_passes_through() {
        let err = LifecycleError::Creation {
            name: "web".to_string(),
            source: DaemonError::NotFound("No such image: nope:latest".to_string()),
        };

        match ApiError::from(err) {
            ApiError::Failed(message) => assert_eq!(message, "No such image: nope:latest"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
