//! Root endpoint.

use axum::Json;

use super::StatusResponse;

/// Liveness check for the gateway itself; never touches the daemon.
///
/// ```text
/// GET /
///
/// Response: 200 OK
/// { "status": "success" }
/// ```
pub async fn index() -> Json<StatusResponse> {
    Json(StatusResponse::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn index_reports_success() {
        let Json(body) = index().await;
        assert_eq!(body, StatusResponse::SUCCESS);
    }
}
