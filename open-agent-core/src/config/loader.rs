use super::CONFIG_PATH;
use super::agent::{AgentSettings, RawAgentSettings};
use super::error::ConfigError;
use super::provider::{ProviderConfig, RawProviderConfig};
use super::server::{RawServer, ServerConfig};
use crate::application::tooling::namespace;
use crate::constants::{ENV_PATH, NAMESPACE_SEPARATOR};
use dotenvy::from_filename;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use tracing::debug;

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawConfig {
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub servers: Vec<RawServer>,
    #[serde(default)]
    pub provider: RawProviderConfig,
    #[serde(default)]
    pub agent: RawAgentSettings,
}

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        if let Err(err) = from_filename(ENV_PATH) {
            debug!(path = ENV_PATH, %err, "No environment file loaded");
        }
    });
}

/// Load and validate configuration from a file path
pub fn load_config(path: Option<&Path>) -> Result<super::AppConfig, ConfigError> {
    ensure_env_loaded();
    let config_path = path.unwrap_or_else(|| Path::new(CONFIG_PATH));
    read_config(config_path)
}

fn read_config(path: &Path) -> Result<super::AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading agent configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(&content, path)
}

pub(super) fn parse_config(content: &str, path: &Path) -> Result<super::AppConfig, ConfigError> {
    let parsed: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<super::AppConfig, ConfigError> {
    if parsed.servers.is_empty() {
        return Err(ConfigError::NoServersConfigured);
    }

    let mut seen = HashSet::new();
    for server in &parsed.servers {
        validate_server_name(&server.name)?;
        if !seen.insert(server.name.clone()) {
            return Err(ConfigError::DuplicateServer {
                name: server.name.clone(),
            });
        }
    }

    if parsed.agent.max_iterations == Some(0) {
        return Err(ConfigError::InvalidAgentSetting {
            field: "max_iterations",
            reason: "must be at least 1".to_string(),
        });
    }

    let system_prompt = parsed
        .system_prompt
        .filter(|prompt| !prompt.trim().is_empty());

    Ok(super::AppConfig {
        system_prompt,
        servers: parsed.servers.into_iter().map(ServerConfig::from).collect(),
        provider: ProviderConfig::from(parsed.provider),
        agent: AgentSettings::from(parsed.agent),
    })
}

fn validate_server_name(name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::InvalidServerName {
            name: name.to_string(),
            reason: "name cannot be empty".to_string(),
        });
    }
    if name.contains(NAMESPACE_SEPARATOR) {
        return Err(ConfigError::InvalidServerName {
            name: name.to_string(),
            reason: format!("name cannot contain the reserved separator '{NAMESPACE_SEPARATOR}'"),
        });
    }
    if !namespace::is_valid_server_name(name) {
        return Err(ConfigError::InvalidServerName {
            name: name.to_string(),
            reason: "name cannot end with '_'".to_string(),
        });
    }
    Ok(())
}
