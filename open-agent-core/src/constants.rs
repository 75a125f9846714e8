//! Application constants
//!
//! Single source of truth for paths and defaults.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/agent.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// Separator between a server name and a bare tool name.
pub const NAMESPACE_SEPARATOR: &str = "__";

/// MCP protocol revision announced during `initialize`
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// How long a tool server may take to answer `initialize`
pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 30;

/// JSON-RPC "invalid params" code, used by tool servers to reject arguments
pub const INVALID_PARAMS_CODE: i64 = -32602;

pub const DEFAULT_ENDPOINT: &str = "https://api.fireworks.ai/inference/v1";
pub const DEFAULT_API_PATH: &str = "/chat/completions";
pub const DEFAULT_API_KEY_ENV: &str = "FIREWORKS_API_KEY";
pub const DEFAULT_MODEL: &str = "accounts/fireworks/models/deepseek-v3p1";

pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_MAX_RESULT_CHARS: usize = 8000;
pub const DEFAULT_RETRY_DELAYS_MS: [u64; 2] = [500, 1000];

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant with access to external tools. \
Use the tools when they help answer the user's request, and answer directly when they do not. \
Summarise tool results for the user instead of repeating them verbatim.";

/// Assistant text appended when a turn runs out of iterations.
pub const ITERATION_LIMIT_MESSAGE: &str =
    "I reached the maximum number of steps for this request before finishing. \
Please try a narrower request or continue the conversation.";
