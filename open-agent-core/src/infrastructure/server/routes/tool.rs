use super::super::dto::{ErrorResponse, ToolCallResponse};
use super::super::state::ServerState;
use super::{ApiError, api_error};
use crate::application::tooling::ToolInvokeError;
use crate::model::CompletionBackend;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Call one tool directly, bypassing the agent. Body: `{"args": {...}}`, optional.
#[utoipa::path(
    post,
    path = "/tool/{name}",
    tag = "tools",
    params(("name" = String, Path, description = "Namespaced tool name, e.g. notion__search")),
    responses(
        (status = 200, description = "Tool result text", body = ToolCallResponse),
        (status = 400, description = "Body is not valid JSON or arguments were rejected", body = ErrorResponse),
        (status = 404, description = "Tool name does not resolve to a connected server", body = ErrorResponse),
        (status = 502, description = "Tool server failed", body = ErrorResponse)
    )
)]
pub async fn tool_call_handler<B: CompletionBackend>(
    State(state): State<Arc<ServerState<B>>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ToolCallResponse>, ApiError> {
    let args = parse_args(&body)?;
    info!(tool = %name, "Received /tool request");

    let agent = state.agent();
    match agent.tools().invoke(&name, args).await {
        Ok(output) => Ok(Json(ToolCallResponse {
            tool: name,
            result: output.into_text(),
        })),
        Err(err) => {
            warn!(tool = %name, error = %err, "Direct tool call failed");
            Err(api_error(status_for(&err), err.user_message()))
        }
    }
}

fn parse_args(body: &[u8]) -> Result<Value, ApiError> {
    let empty = || Value::Object(Map::new());
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(empty());
    }
    let payload: Value = serde_json::from_slice(body)
        .map_err(|err| api_error(StatusCode::BAD_REQUEST, format!("invalid JSON body: {err}")))?;
    Ok(match payload.get("args") {
        Some(Value::Null) | None => empty(),
        Some(args) => args.clone(),
    })
}

fn status_for(err: &ToolInvokeError) -> StatusCode {
    match err {
        ToolInvokeError::UnknownNamespace { .. } | ToolInvokeError::ServerNotConnected { .. } => {
            StatusCode::NOT_FOUND
        }
        err if err.is_invalid_arguments() => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}
