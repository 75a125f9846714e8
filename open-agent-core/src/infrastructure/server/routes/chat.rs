use super::super::dto::{ErrorResponse, RestChatRequest, RestChatResponse};
use super::super::state::ServerState;
use super::{ApiError, api_error};
use crate::model::CompletionBackend;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{error, info};

#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = RestChatRequest,
    responses(
        (status = 200, description = "Turn completed", body = RestChatResponse),
        (status = 400, description = "Message is missing or blank", body = ErrorResponse),
        (status = 502, description = "Model backend or tool servers unavailable", body = ErrorResponse)
    )
)]
pub async fn chat_handler<B: CompletionBackend>(
    State(state): State<Arc<ServerState<B>>>,
    Json(payload): Json<RestChatRequest>,
) -> Result<Json<RestChatResponse>, ApiError> {
    let RestChatRequest { message, history } = payload;
    info!(
        history = history.as_ref().map_or(0, Vec::len),
        "Received /chat request"
    );

    if message.trim().is_empty() {
        error!("Rejecting /chat request due to empty message");
        return Err(api_error(StatusCode::BAD_REQUEST, "message is required"));
    }

    match state.agent().chat(&message, history).await {
        Ok(outcome) => Ok(Json(RestChatResponse {
            response: outcome.response,
            history: outcome.conversation,
        })),
        Err(err) => {
            error!(error = %err, "Chat turn failed");
            Err(api_error(StatusCode::BAD_GATEWAY, err.user_message()))
        }
    }
}
