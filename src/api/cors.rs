//! Cross-origin middleware.
//!
//! Preflights are answered here with `204` and never reach a handler.
//! A request whose `Origin` is not on the allow-list is still served, it
//! just gets no `Access-Control-Allow-*` headers, and the browser does the
//! refusing.

use crate::config::CorsConfig;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_METHOD, HeaderMap, HeaderValue, ORIGIN, VARY,
};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use tracing::debug;

pub async fn apply(
    State(cors): State<Arc<CorsConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request.headers().get(ORIGIN).cloned();

    if is_preflight(&request) {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        match origin.filter(|origin| allowed(&cors, origin)) {
            Some(origin) => preflight_headers(&cors, origin, response.headers_mut()),
            None => debug!(path = %request.uri().path(), "Preflight from disallowed origin"),
        }
        return response;
    }

    let mut response = next.run(request).await;
    if let Some(origin) = origin.filter(|origin| allowed(&cors, origin)) {
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }
    response
}

fn is_preflight(request: &Request) -> bool {
    request.method() == Method::OPTIONS
        && request.headers().contains_key(ORIGIN)
        && request.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}

fn allowed(cors: &CorsConfig, origin: &HeaderValue) -> bool {
    origin.to_str().is_ok_and(|origin| cors.allows_origin(origin))
}

fn preflight_headers(cors: &CorsConfig, origin: HeaderValue, headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    if let Some(methods) = joined(&cors.allow_methods) {
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, methods);
    }
    if let Some(allow_headers) = joined(&cors.allow_headers) {
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
    }
    if let Some(max_age) = cors.max_age {
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age));
    }
    headers.append(VARY, HeaderValue::from_static("Origin"));
}

/// `None` for an empty list or one that is not a legal header value.
fn joined(values: &[String]) -> Option<HeaderValue> {
    if values.is_empty() {
        return None;
    }
    HeaderValue::from_str(&values.join(", ")).ok()
}
