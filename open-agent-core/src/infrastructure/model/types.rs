//! Model types - Request, Response, and Error types

use crate::domain::types::{ConversationMessage, NamespacedTool, ToolInvocationRequest};
use reqwest::StatusCode;
use thiserror::Error;

/// Everything the backend sees for one decision.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub messages: &'a [ConversationMessage],
    pub tools: &'a [NamespacedTool],
}

/// Assistant reply: optional text plus zero or more tool calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolInvocationRequest>,
}

impl ModelResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolInvocationRequest>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    pub fn into_message(self) -> ConversationMessage {
        ConversationMessage::Assistant {
            content: self.content,
            tool_calls: self.tool_calls,
        }
    }
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: String },
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' answered {status}: {body}")]
    Status {
        provider: String,
        status: StatusCode,
        body: String,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl ModelError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn status(provider: impl Into<String>, status: StatusCode, body: impl Into<String>) -> Self {
        Self::Status {
            provider: provider.into(),
            status,
            body: body.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Whether the backend rejected the request itself (too large or malformed).
    ///
    /// Uses the HTTP status when one is known; only status-less errors fall back to
    /// matching their own reason text. The provider id and request URL are never
    /// matched, since endpoints such as `localhost:4000` contain the digits.
    pub fn is_bad_request(&self) -> bool {
        match self {
            ModelError::MissingApiKey { .. } => false,
            ModelError::Status { status, .. } => is_request_rejection(*status),
            ModelError::Network { source, .. } => match source.status() {
                Some(status) => is_request_rejection(status),
                None => mentions_bad_request(&network_reason(source)),
            },
            ModelError::InvalidResponse { reason, .. } => mentions_bad_request(reason),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ModelError::MissingApiKey { provider } => {
                format!("The model provider '{provider}' needs an API key.")
            }
            ModelError::Network { provider, source } => {
                if source.is_connect() {
                    format!("Could not reach the model provider '{provider}'.")
                } else if source.is_timeout() {
                    format!("The request to '{provider}' timed out.")
                } else {
                    format!("Network error while calling '{provider}'.")
                }
            }
            ModelError::Status {
                provider, status, ..
            } => match *status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    format!("The model provider '{provider}' rejected the API key.")
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    format!("The model provider '{provider}' is rate limiting requests.")
                }
                StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                    format!("The model provider '{provider}' is currently unavailable.")
                }
                other => format!("The request to '{provider}' failed: {}", other.as_u16()),
            },
            ModelError::InvalidResponse { provider, .. } => {
                format!("The response from '{provider}' could not be understood.")
            }
        }
    }
}

/// reqwest's rendering with the request URL removed.
fn network_reason(source: &reqwest::Error) -> String {
    let rendered = source.to_string();
    match source.url() {
        Some(url) => rendered.replace(url.as_str(), ""),
        None => rendered,
    }
}

fn mentions_bad_request(reason: &str) -> bool {
    let reason = reason.to_lowercase();
    ["400", "bad request", "invalid request"]
        .iter()
        .any(|needle| reason.contains(needle))
}

fn is_request_rejection(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNPROCESSABLE_ENTITY
    )
}
