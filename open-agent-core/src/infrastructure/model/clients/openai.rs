//! OpenAI-compatible client implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::base::{HttpClientBase, resolve_api_key};
use crate::config::ProviderConfig;
use crate::domain::types::ToolInvocationRequest;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::CompletionBackend;
use crate::infrastructure::model::types::{ModelError, ModelRequest, ModelResponse};

/// OpenAI-compatible client (Fireworks, OpenAI, Groq, vLLM, ...)
#[derive(Clone)]
pub struct OpenAIClient {
    base: HttpClientBase,
    api_path: String,
    model: String,
}

impl OpenAIClient {
    pub fn from_config(config: &ProviderConfig) -> Self {
        let api_key = resolve_api_key(&config.endpoint, config.api_key.as_deref());
        Self {
            base: HttpClientBase::new(config.endpoint.clone(), config.endpoint.clone(), api_key),
            api_path: config.api_path.clone(),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for OpenAIClient {
    async fn complete(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let url = self.base.build_url(&self.api_path);

        let payload = OpenAIRequest {
            model: &self.model,
            messages: MessageAdapter::to_openai_messages(request.messages),
            tools: MessageAdapter::to_openai_tools(request.tools),
            stream: false,
        };

        info!(
            provider = self.base.id.as_str(),
            model = self.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending request to OpenAI-compatible provider"
        );

        let response: OpenAIResponse = self.base.post_with_bearer(&url, &payload).await?;
        debug!("Received response from OpenAI-compatible provider");

        let message = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "no choices in response"))?;

        Ok(message.into_response())
    }
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<OpenAIToolCall>,
}

#[derive(Deserialize)]
struct OpenAIToolCall {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    function: OpenAIFunctionCall,
}

#[derive(Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl OpenAIMessage {
    fn into_response(self) -> ModelResponse {
        let tool_calls = self
            .tool_calls
            .into_iter()
            .filter(|call| call.kind.as_deref().is_none_or(|kind| kind == "function"))
            .map(|call| {
                let arguments = match call.function.arguments {
                    Value::String(raw) => raw,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                ToolInvocationRequest {
                    id: call
                        .id
                        .filter(|id| !id.is_empty())
                        .unwrap_or_else(|| format!("call-{}", Uuid::new_v4())),
                    name: call.function.name,
                    arguments,
                }
            })
            .collect();
        ModelResponse {
            content: self.content,
            tool_calls,
        }
    }
}
