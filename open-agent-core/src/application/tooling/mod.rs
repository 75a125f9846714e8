//! # Tooling Module
//!
//! Connections to external tool servers and the facade the agent calls tools through.
//!
//! - [`ConnectionManager`] owns one live connection per configured server, connects them
//!   concurrently, and replaces a connection wholesale when its transport breaks.
//! - [`ToolRegistry`] caches the namespaced tool catalog and routes calls by namespace.
//! - [`McpProcess`] is the stdio JSON-RPC connection used in production.

mod connection;
mod error;
mod manager;
pub mod namespace;
mod process;
mod registry;

pub use connection::{ServerConnector, ServerToolInfo, ToolOutput, ToolServerConnection};
pub use error::ToolInvokeError;
pub use manager::{ConnectSummary, ConnectionManager, ServerConnection};
pub use process::{McpProcess, StdioConnector};
pub use registry::ToolRegistry;
