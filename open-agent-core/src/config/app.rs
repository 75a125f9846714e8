use super::agent::AgentSettings;
use super::error::ConfigError;
use super::provider::ProviderConfig;
use super::server::ServerConfig;
use std::path::Path;

/// Application configuration loaded from agent.toml
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub system_prompt: Option<String>,
    pub servers: Vec<ServerConfig>,
    pub provider: ProviderConfig,
    pub agent: AgentSettings,
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Parse configuration from TOML text. `origin` is only used in error messages.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        super::loader::parse_config(content, origin)
    }
}
