//! Tool-calling assistant core: connections to MCP tool servers, namespaced tool routing,
//! and the bounded agent loop that answers a chat turn.

pub mod application;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, stdio, tooling};
pub use config::{AppConfig, ConfigError};
pub use domain::types;
pub use infrastructure::{model, server};
