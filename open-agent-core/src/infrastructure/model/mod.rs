//! Model infrastructure module
//!
//! The completion backend the agent loop consults for each decision.
//!
//! # Structure
//! - `types` - Request, Response, Error types
//! - `traits` - CompletionBackend trait
//! - `adapter` - Conversation to wire-format conversion
//! - `clients` - HTTP client implementations

pub mod adapter;
pub mod clients;
pub mod traits;
pub mod types;

pub use clients::OpenAIClient;
pub use traits::CompletionBackend;
pub use types::{ModelError, ModelRequest, ModelResponse};
