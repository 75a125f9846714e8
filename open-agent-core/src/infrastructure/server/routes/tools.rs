use super::super::dto::{ErrorResponse, ToolInventoryResponse};
use super::super::state::ServerState;
use super::{ApiError, api_error};
use crate::model::CompletionBackend;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::debug;

#[utoipa::path(
    get,
    path = "/tools",
    tag = "tools",
    responses(
        (status = 200, description = "Namespaced tool catalog", body = ToolInventoryResponse),
        (status = 502, description = "No tool server could be listed", body = ErrorResponse)
    )
)]
pub async fn tools_handler<B: CompletionBackend>(
    State(state): State<Arc<ServerState<B>>>,
) -> Result<Json<ToolInventoryResponse>, ApiError> {
    let agent = state.agent();
    let tools = agent
        .tools()
        .tools()
        .await
        .map_err(|err| api_error(StatusCode::BAD_GATEWAY, err.user_message()))?;
    debug!(tool_count = tools.len(), "Serving /tools request");
    Ok(Json(ToolInventoryResponse::from(tools)))
}
