//! # Agent Module
//!
//! Turns one user message into a final answer by alternating between the completion
//! backend and the tools it asks for.
//!
//! ## Key Types
//!
//! - [`Agent`] - The loop executor
//! - [`ChatOutcome`] - Final answer plus the updated conversation
//! - [`RetrySchedule`] - Backoff applied to each tool invocation
//! - [`AgentError`] - Failures that end a turn without an answer
//!
//! ## Agent Loop
//!
//! 1. Send the conversation and tool catalog to the backend
//! 2. No tool calls requested: the reply is the answer
//! 3. Otherwise execute each call in order, append results, and go again
//! 4. Stop with a fixed message after `max_iterations` rounds

mod errors;
mod models;
mod retry;
mod runner;
mod synthesis;
mod truncation;

pub use errors::AgentError;
pub use models::{ChatOutcome, LoopState};
pub use retry::{InvocationOutcome, RetrySchedule, invoke_with_retry};
pub use runner::Agent;
pub use synthesis::synthesize_response;
pub use truncation::truncate_result;
