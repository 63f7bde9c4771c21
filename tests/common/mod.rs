//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use gamify_back::{
    config::AppConfig, dao::game_store::memory::InMemoryGameStore, routes, state::AppState,
};

pub const OWNER: &str = "u1";
pub const STRANGER: &str = "u2";

/// Full router backed by a fresh in-memory store.
pub async fn build_test_app() -> Router {
    let state =
        AppState::with_store(AppConfig::default(), Arc::new(InMemoryGameStore::new())).await;
    routes::router(state)
}

/// Full router whose state never received a store.
pub fn build_degraded_app() -> Router {
    routes::router(AppState::new(AppConfig::default()))
}

/// Send one request and decode the JSON answer; empty bodies decode to `Value::Null`.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post(app: &Router, uri: &str, user: Option<&str>, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, user, Some(body)).await
}

pub async fn patch(
    app: &Router,
    uri: &str,
    user: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    send(app, Method::PATCH, uri, user, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, user, None).await
}

/// Create a game owned by [`OWNER`] and return its id.
pub async fn create_game(app: &Router, body: Value) -> String {
    let (status, json) = post(app, "/v1/games", Some(OWNER), body).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {json}");
    json["id"].as_str().unwrap().to_owned()
}
