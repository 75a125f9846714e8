use crate::domain::types::ConversationMessage;
use serde::Serialize;

/// Where a turn is in the decide/execute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    AwaitingDecision,
    ExecutingTools,
    Done,
    StoppedByLimit,
}

impl LoopState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoopState::Done | LoopState::StoppedByLimit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub response: String,
    pub conversation: Vec<ConversationMessage>,
    /// Terminal state the turn ended in.
    pub state: LoopState,
}
