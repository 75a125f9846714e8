use crate::application::tooling::{ToolInvokeError, ToolOutput, ToolRegistry};
use serde_json::Value;
use std::iter;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Backoff applied to a single tool invocation.
///
/// Attempt 1 runs immediately; each configured delay adds one more attempt after
/// waiting that long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySchedule {
    delays: Vec<Duration>,
}

impl RetrySchedule {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    pub fn total_attempts(&self) -> usize {
        self.delays.len() + 1
    }

    /// Every attempt as `(attempt, delay before it)`, starting with `(1, 0)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Duration)> + '_ {
        iter::once((1, Duration::ZERO)).chain(self.retries())
    }

    /// Attempts after the first.
    pub fn retries(&self) -> impl Iterator<Item = (usize, Duration)> + '_ {
        self.delays
            .iter()
            .copied()
            .enumerate()
            .map(|(index, delay)| (index + 2, delay))
    }
}

#[derive(Debug)]
pub enum InvocationOutcome {
    Completed(ToolOutput),
    /// The server rejected the arguments; not retried.
    InvalidArguments(ToolInvokeError),
    Failed {
        attempts: usize,
        error: ToolInvokeError,
    },
}

impl InvocationOutcome {
    /// Text placed in the tool-result message. Only completed output is truncated.
    pub fn render(self, tool: &str, max_chars: usize) -> String {
        match self {
            InvocationOutcome::Completed(output) => {
                super::truncate_result(output.into_text(), max_chars)
            }
            InvocationOutcome::InvalidArguments(error) => {
                format!("Error: invalid arguments for tool {tool}: {error}")
            }
            InvocationOutcome::Failed { attempts, error } => {
                format!("Error: tool {tool} failed after {attempts} attempts: {error}")
            }
        }
    }
}

/// Call a tool through the registry, retrying any failure except an argument rejection.
pub async fn invoke_with_retry(
    registry: &ToolRegistry,
    tool: &str,
    arguments: Value,
    schedule: &RetrySchedule,
) -> InvocationOutcome {
    let mut error = match registry.invoke(tool, arguments.clone()).await {
        Ok(output) => return InvocationOutcome::Completed(output),
        Err(err) if err.is_invalid_arguments() => return InvocationOutcome::InvalidArguments(err),
        Err(err) => err,
    };

    for (attempt, delay) in schedule.retries() {
        warn!(
            tool,
            attempt,
            delay_ms = delay.as_millis() as u64,
            %error,
            "Tool call failed, retrying"
        );
        sleep(delay).await;
        error = match registry.invoke(tool, arguments.clone()).await {
            Ok(output) => return InvocationOutcome::Completed(output),
            Err(err) if err.is_invalid_arguments() => {
                return InvocationOutcome::InvalidArguments(err);
            }
            Err(err) => err,
        };
    }

    warn!(tool, attempts = schedule.total_attempts(), %error, "Tool call gave up");
    InvocationOutcome::Failed {
        attempts: schedule.total_attempts(),
        error,
    }
}
