//! REST front-end: `/chat`, `/tools` and `/tool/{name}` over axum.

mod docs;
mod dto;
mod error;
mod router;
mod routes;
mod state;

pub use dto::{
    ErrorResponse, RestChatRequest, RestChatResponse, ToolCallResponse, ToolInventoryResponse,
};
pub use error::ServerError;
pub use router::router;

use crate::agent::Agent;
use crate::model::CompletionBackend;
use std::net::SocketAddr;
use std::sync::Arc;

/// Serve until Ctrl-C or SIGTERM, then disconnect every tool server.
pub async fn serve<B>(agent: Arc<Agent<B>>, addr: SocketAddr) -> Result<(), ServerError>
where
    B: CompletionBackend + 'static,
{
    router::serve(agent, addr).await
}
