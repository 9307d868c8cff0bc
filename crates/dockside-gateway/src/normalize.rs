//! Request path normalization.
//!
//! Routes are registered with a trailing slash. Before a request reaches the
//! router its path gets one appended if missing, and runs of slashes are
//! collapsed, so `/containers`, `/containers/` and `//containers` all land on
//! the same route. The query string is left alone.
//!
//! Normalization has to wrap the [`Router`](axum::Router) rather than be
//! added with `Router::layer`, since the latter only runs after a route has
//! matched.

use std::borrow::Cow;

use axum::extract::Request;
use axum::http::uri::PathAndQuery;
use axum::http::Uri;
use tower::util::MapRequest;

/// A service whose requests are normalized before reaching `S`.
pub type Normalized<S> = MapRequest<S, fn(Request) -> Request>;

/// Wrap `service` so every request path is normalized first.
pub fn normalize_paths<S>(service: S) -> Normalized<S> {
    MapRequest::new(service, normalize_request as fn(Request) -> Request)
}

fn normalize_request(mut request: Request) -> Request {
    let uri = request.uri().clone();
    let path = match normalize_path(uri.path()) {
        Cow::Borrowed(_) => return request,
        Cow::Owned(path) => path,
    };

    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    let mut parts = uri.into_parts();
    match PathAndQuery::try_from(path_and_query) {
        Ok(path_and_query) => parts.path_and_query = Some(path_and_query),
        Err(err) => {
            tracing::debug!(error = %err, "Leaving unparsable path as is");
            return request;
        }
    }

    match Uri::from_parts(parts) {
        Ok(normalized) => *request.uri_mut() = normalized,
        Err(err) => tracing::debug!(error = %err, "Leaving unparsable uri as is"),
    }

    request
}

/// Collapse repeated slashes and ensure a trailing slash.
///
/// Returns the input unchanged, without allocating, when it is already
/// normalized.
#[must_use]
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.ends_with('/') && !path.contains("//") {
        return Cow::Borrowed(path);
    }

    let mut normalized = String::with_capacity(path.len() + 1);
    for c in path.chars() {
        if c == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(c);
    }
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    Cow::Owned(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn appends_trailing_slash() {
        assert_eq!(normalize_path("/containers"), "/containers/");
        assert_eq!(normalize_path("/containers/web/start"), "/containers/web/start/");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn merges_duplicate_slashes() {
        assert_eq!(normalize_path("//containers//web///"), "/containers/web/");
        assert_eq!(normalize_path("//"), "/");
    }

    #[test]
    fn normalized_paths_are_borrowed() {
        assert!(matches!(normalize_path("/"), Cow::Borrowed("/")));
        assert!(matches!(
            normalize_path("/containers/web/"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn query_string_is_preserved() {
        let request = Request::builder()
            .uri("/containers//web?verbose=1&x=/a//b")
            .body(Body::empty())
            .unwrap();

        let request = normalize_request(request);
        assert_eq!(request.uri().path(), "/containers/web/");
        assert_eq!(request.uri().query(), Some("verbose=1&x=/a//b"));
    }

    #[test]
    fn absolute_uri_keeps_authority() {
        let request = Request::builder()
            .uri("http://localhost:8080/containers")
            .body(Body::empty())
            .unwrap();

        let request = normalize_request(request);
        assert_eq!(request.uri().to_string(), "http://localhost:8080/containers/");
    }
}
