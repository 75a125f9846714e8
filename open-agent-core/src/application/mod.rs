//! # Application Module
//!
//! ## Submodules
//!
//! - [`tooling`] - Tool-server connections, namespacing and call routing
//! - [`agent`] - The bounded model/tool loop that answers one chat turn
//! - [`stdio`] - Interactive command-line chat

pub mod agent;
pub mod stdio;
pub mod tooling;
