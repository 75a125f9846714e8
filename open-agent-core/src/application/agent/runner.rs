use super::errors::AgentError;
use super::models::{ChatOutcome, LoopState};
use super::retry::{RetrySchedule, invoke_with_retry};
use super::synthesis::synthesize_response;
use crate::application::tooling::ToolRegistry;
use crate::config::AgentSettings;
use crate::constants::{DEFAULT_SYSTEM_PROMPT, ITERATION_LIMIT_MESSAGE};
use crate::domain::types::{CollectedToolResult, ConversationMessage, ToolInvocationRequest};
use crate::infrastructure::model::{CompletionBackend, ModelRequest};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Agent<B: CompletionBackend> {
    backend: Arc<B>,
    tools: Arc<ToolRegistry>,
    settings: AgentSettings,
    retry: RetrySchedule,
    system_prompt: String,
}

impl<B: CompletionBackend> Agent<B> {
    pub fn new(backend: Arc<B>, tools: Arc<ToolRegistry>, settings: AgentSettings) -> Self {
        let retry = RetrySchedule::new(settings.retry_delays.clone());
        Self {
            backend,
            tools,
            settings,
            retry,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    /// Run one turn. `history` replaces the system instruction when present and non-empty.
    pub async fn chat(
        &self,
        user_message: &str,
        history: Option<Vec<ConversationMessage>>,
    ) -> Result<ChatOutcome, AgentError> {
        let catalog = self.tools.tools().await?;
        let mut conversation = self.seed(user_message, history);
        let mut collected: Vec<CollectedToolResult> = Vec::new();
        info!(
            seed = conversation.len(),
            tools = catalog.len(),
            "Agent turn started"
        );

        for iteration in 1..=self.settings.max_iterations {
            debug!(iteration, state = ?LoopState::AwaitingDecision, "Consulting backend");
            let request = ModelRequest {
                messages: &conversation,
                tools: catalog,
            };
            let reply = match self.backend.complete(request).await {
                Ok(reply) => reply,
                Err(err) if iteration > 1 && err.is_bad_request() => {
                    warn!(
                        iteration,
                        collected = collected.len(),
                        error = %err,
                        "Backend rejected the request, synthesizing answer from tool results"
                    );
                    let response = synthesize_response(user_message, &collected);
                    conversation.push(ConversationMessage::assistant(response.clone()));
                    return Ok(ChatOutcome {
                        response,
                        conversation,
                        state: LoopState::Done,
                    });
                }
                Err(err) => {
                    warn!(iteration, error = %err, "Backend call failed");
                    return Err(err.into());
                }
            };

            let calls = reply.tool_calls.clone();
            conversation.push(reply.into_message());

            if calls.is_empty() {
                let response = conversation
                    .last()
                    .and_then(ConversationMessage::text)
                    .unwrap_or_default()
                    .to_string();
                info!(iteration, "Agent turn finished");
                return Ok(ChatOutcome {
                    response,
                    conversation,
                    state: LoopState::Done,
                });
            }

            debug!(iteration, calls = calls.len(), state = ?LoopState::ExecutingTools, "Executing tool calls");
            for call in &calls {
                let message = self.execute(call, &mut collected).await;
                conversation.push(message);
            }
        }

        warn!(
            max_iterations = self.settings.max_iterations,
            "Agent turn stopped at iteration limit"
        );
        conversation.push(ConversationMessage::assistant(ITERATION_LIMIT_MESSAGE));
        Ok(ChatOutcome {
            response: ITERATION_LIMIT_MESSAGE.to_string(),
            conversation,
            state: LoopState::StoppedByLimit,
        })
    }

    fn seed(
        &self,
        user_message: &str,
        history: Option<Vec<ConversationMessage>>,
    ) -> Vec<ConversationMessage> {
        let mut conversation = match history {
            Some(history) if !history.is_empty() => history,
            _ => vec![ConversationMessage::system(self.system_prompt.clone())],
        };
        conversation.push(ConversationMessage::user(user_message));
        conversation
    }

    /// Execute one requested call and produce its tool-result message.
    async fn execute(
        &self,
        call: &ToolInvocationRequest,
        collected: &mut Vec<CollectedToolResult>,
    ) -> ConversationMessage {
        let arguments = match parse_arguments(&call.arguments) {
            Ok(arguments) => arguments,
            Err(err) => {
                warn!(tool = %call.name, error = %err, "Tool call arguments are not valid JSON");
                return ConversationMessage::tool_result(
                    &call.id,
                    format!(
                        "Error: malformed JSON arguments for tool {}: {err}. Raw arguments: {}",
                        call.name, call.arguments
                    ),
                );
            }
        };

        info!(tool = %call.name, "Invoking tool");
        let outcome = invoke_with_retry(&self.tools, &call.name, arguments, &self.retry).await;
        let result = outcome.render(&call.name, self.settings.max_result_chars);
        collected.push(CollectedToolResult {
            tool: call.name.clone(),
            result: result.clone(),
        });
        ConversationMessage::tool_result(&call.id, result)
    }
}

/// Blank argument text means "no arguments".
fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}
