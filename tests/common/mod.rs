#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tenflow::{app::build_app, config::AppConfig, state::AppState};
use tower::ServiceExt;

/// State against the database named by `TEST_DATABASE_URL`, migrated.
pub async fn state() -> AppState {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some(url.clone()),
        "SECRET_KEY" => Some("integration-secret".into()),
        _ => None,
    })
    .expect("config");
    let state = AppState::new(config);
    state.db.migrate().await.expect("migrate");
    state
}

pub async fn app() -> (AppState, Router) {
    let state = state().await;
    let app = build_app(state.clone());
    (state, app)
}

pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub async fn register(app: &Router, email: &str, password: &str) -> Value {
    let req = Request::post("/api/v1/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": email, "password": password, "full_name": "Test User" }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

pub async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    let form = format!("username={email}&password={password}").replace('@', "%40");
    let req = Request::post("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    send(app, req).await
}

pub async fn login_token(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = login(app, email, password).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["access_token"].as_str().expect("access_token").to_string()
}

pub fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
