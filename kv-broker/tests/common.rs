#![allow(dead_code)]

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use kv_broker::api::{self, AppState};
use kv_broker::catalog::default_catalog;
use kv_broker::guard::{AccessGuard, BasicCredentials};
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "passw0rd";

pub fn make_state() -> AppState {
    AppState::new(
        default_catalog(),
        AccessGuard::new(BasicCredentials::new(ADMIN_USER, ADMIN_PASSWORD), false),
        Some("broker.test".to_string()),
    )
}

pub fn admin() -> Option<(&'static str, &'static str)> {
    Some((ADMIN_USER, ADMIN_PASSWORD))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    creds: Option<(&str, &str)>,
    body: impl Into<Body>,
) -> Result<TestResponse> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user, password)) = creds {
        let token = STANDARD.encode(format!("{user}:{password}"));
        builder = builder.header(header::AUTHORIZATION, format!("Basic {token}"));
    }
    let request = builder.body(body.into())?;

    let response: Response<Body> = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

    Ok(TestResponse {
        status,
        headers,
        body: body.to_vec(),
    })
}

pub fn router(state: AppState) -> Router {
    api::router(state)
}
