// REST route tests - /chat validation and error mapping

#[path = "../support/mod.rs"]
mod support;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use open_agent_core::agent::Agent;
use open_agent_core::config::{AgentSettings, ServerConfig};
use open_agent_core::model::{ModelError, ModelResponse};
use open_agent_core::server::router;
use open_agent_core::tooling::{ConnectionManager, ToolRegistry};
use serde_json::{Value, json};
use std::sync::Arc;
use support::{FakeConnector, FakeServer, ScriptedBackend};
use tower::ServiceExt;

async fn app(backend: Arc<ScriptedBackend>) -> axum::Router {
    let manager = Arc::new(ConnectionManager::new(Arc::new(
        FakeConnector::default().with_server("notion", FakeServer::new(&["search"])),
    )));
    manager
        .connect_all(&[ServerConfig::new("notion", "npx")])
        .await
        .expect("connect");
    let registry = Arc::new(ToolRegistry::new(manager));
    router(Arc::new(Agent::new(
        backend,
        registry,
        AgentSettings::default(),
    )))
}

async fn post_chat(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}

#[tokio::test]
async fn blank_message_is_rejected_without_calling_the_model() {
    let backend = ScriptedBackend::repeating(ModelResponse::text("unused"));
    let app = app(Arc::clone(&backend)).await;

    let (status, body) = post_chat(app, json!({ "message": "   " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "message is required");
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn missing_message_is_treated_as_blank() {
    let backend = ScriptedBackend::repeating(ModelResponse::text("unused"));
    let (status, _) = post_chat(app(Arc::clone(&backend)).await, json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn backend_failure_maps_to_bad_gateway() {
    let backend = ScriptedBackend::new(vec![Err(ModelError::invalid_response(
        "http://localhost:4000/v1",
        "no choices in response",
    ))]);

    let (status, body) = post_chat(app(backend).await, json!({ "message": "hello" })).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|message| message.contains("could not be understood"))
    );
}

#[tokio::test]
async fn successful_turn_returns_response_and_history() {
    let backend = ScriptedBackend::new(vec![Ok(ModelResponse::text("hi there"))]);

    let (status, body) = post_chat(app(backend).await, json!({ "message": "hello" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "hi there");
    let history = body["history"].as_array().expect("history array");
    assert_eq!(history.last().and_then(|m| m["role"].as_str()), Some("assistant"));
}
