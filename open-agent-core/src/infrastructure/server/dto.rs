use crate::domain::types::{ConversationMessage, NamespacedTool};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestChatRequest {
    #[serde(default)]
    pub message: String,
    /// Conversation returned by a previous `/chat` call.
    #[serde(default)]
    pub history: Option<Vec<ConversationMessage>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestChatResponse {
    pub response: String,
    pub history: Vec<ConversationMessage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToolInventoryResponse {
    pub tools: Vec<NamespacedTool>,
    pub count: usize,
}

impl From<&[NamespacedTool]> for ToolInventoryResponse {
    fn from(tools: &[NamespacedTool]) -> Self {
        Self {
            tools: tools.to_vec(),
            count: tools.len(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToolCallResponse {
    pub tool: String,
    pub result: String,
}
