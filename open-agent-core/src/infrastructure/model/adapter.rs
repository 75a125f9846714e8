//! Message adapters - convert conversations to the OpenAI chat format

use crate::domain::types::{ConversationMessage, NamespacedTool, ToolInvocationRequest};
use serde_json::{Value, json};

/// Adapter for converting messages and tools to the OpenAI wire format
pub struct MessageAdapter;

impl MessageAdapter {
    pub fn to_openai_messages(messages: &[ConversationMessage]) -> Vec<Value> {
        messages.iter().map(Self::to_openai_message).collect()
    }

    pub fn to_openai_message(message: &ConversationMessage) -> Value {
        match message {
            ConversationMessage::System { content } => {
                json!({ "role": "system", "content": content })
            }
            ConversationMessage::User { content } => json!({ "role": "user", "content": content }),
            ConversationMessage::Assistant {
                content,
                tool_calls,
            } => {
                let mut value = json!({ "role": "assistant", "content": content });
                if !tool_calls.is_empty() {
                    value["tool_calls"] =
                        Value::Array(tool_calls.iter().map(Self::to_openai_tool_call).collect());
                }
                value
            }
            ConversationMessage::Tool {
                tool_call_id,
                content,
            } => json!({ "role": "tool", "tool_call_id": tool_call_id, "content": content }),
        }
    }

    fn to_openai_tool_call(call: &ToolInvocationRequest) -> Value {
        json!({
            "id": call.id,
            "type": "function",
            "function": {
                "name": call.name,
                "arguments": call.arguments,
            }
        })
    }

    /// Expose each namespaced tool as a `function` tool.
    pub fn to_openai_tools(tools: &[NamespacedTool]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.namespaced_name,
                        "description": tool.description,
                        "parameters": tool.input_schema,
                    }
                })
            })
            .collect()
    }
}
