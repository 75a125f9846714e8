use super::dto::{
    ErrorResponse, RestChatRequest, RestChatResponse, ToolCallResponse, ToolInventoryResponse,
};
use super::routes;
use crate::domain::types::{ConversationMessage, NamespacedTool, ToolInvocationRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::chat::chat_handler,
        routes::tools::tools_handler,
        routes::tool::tool_call_handler
    ),
    components(
        schemas(
            RestChatRequest,
            RestChatResponse,
            ErrorResponse,
            ToolInventoryResponse,
            ToolCallResponse,
            ConversationMessage,
            ToolInvocationRequest,
            NamespacedTool
        )
    ),
    tags(
        (name = "chat", description = "Agent conversation turns"),
        (name = "tools", description = "Namespaced tools exposed by connected servers")
    )
)]
pub(super) struct ApiDoc;
