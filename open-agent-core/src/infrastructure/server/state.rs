use crate::agent::Agent;
use crate::model::CompletionBackend;
use std::sync::Arc;

pub(crate) struct ServerState<B: CompletionBackend> {
    agent: Arc<Agent<B>>,
}

impl<B: CompletionBackend> ServerState<B> {
    pub(crate) fn new(agent: Arc<Agent<B>>) -> Self {
        Self { agent }
    }

    pub(crate) fn agent(&self) -> Arc<Agent<B>> {
        Arc::clone(&self.agent)
    }
}
