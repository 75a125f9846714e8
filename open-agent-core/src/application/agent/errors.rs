use crate::application::tooling::ToolInvokeError;
use crate::infrastructure::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Backend(#[from] ModelError),
    #[error("tool catalog unavailable: {0}")]
    Catalog(#[from] ToolInvokeError),
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Backend(err) => err.user_message(),
            AgentError::Catalog(err) => err.user_message(),
        }
    }
}
