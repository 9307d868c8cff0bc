//! Responses for requests no handler accepts.

use crate::error::ApiError;

/// Unknown route.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Known route that only accepts `GET`.
pub async fn get_only() -> ApiError {
    ApiError::MethodNotAllowed(&["GET"])
}

/// Known route that only accepts `POST`.
pub async fn post_only() -> ApiError {
    ApiError::MethodNotAllowed(&["POST"])
}

/// Known route that accepts `GET` and `POST`.
pub async fn get_or_post() -> ApiError {
    ApiError::MethodNotAllowed(&["GET", "POST"])
}
