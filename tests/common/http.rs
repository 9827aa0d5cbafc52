#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|err| {
            panic!(
                "response body is not JSON: {err}; body={}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn error(&self) -> String {
        self.json()["error"]
            .as_str()
            .unwrap_or_else(|| panic!("no error field in {:?}", self.json()))
            .to_string()
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|err| panic!("router request failed: {err}"));
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap_or_else(|err| panic!("failed to read response body: {err}"))
        .to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, empty(Method::GET, uri)).await
}

pub async fn delete(router: &Router, uri: &str) -> TestResponse {
    send(router, empty(Method::DELETE, uri)).await
}

pub async fn post_json(router: &Router, uri: &str, body: &Value) -> TestResponse {
    send(router, with_json(Method::POST, uri, body.to_string())).await
}

pub async fn put_json(router: &Router, uri: &str, body: &Value) -> TestResponse {
    send(router, with_json(Method::PUT, uri, body.to_string())).await
}

pub async fn post_raw(router: &Router, uri: &str, raw: &str) -> TestResponse {
    send(router, with_json(Method::POST, uri, raw.to_string())).await
}

pub fn empty(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap_or_else(|err| panic!("failed to build request: {err}"))
}

pub fn with_json(method: Method, uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|err| panic!("failed to build request: {err}"))
}
