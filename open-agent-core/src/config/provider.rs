use crate::constants::{DEFAULT_API_KEY_ENV, DEFAULT_API_PATH, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use serde::Deserialize;

/// Completion backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_path: String,
    /// Name of the environment variable holding the API key.
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            api_key: Some(DEFAULT_API_KEY_ENV.to_string()),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct RawProviderConfig {
    endpoint: Option<String>,
    api_path: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
}

impl From<RawProviderConfig> for ProviderConfig {
    fn from(raw: RawProviderConfig) -> Self {
        let defaults = ProviderConfig::default();
        Self {
            endpoint: raw.endpoint.unwrap_or(defaults.endpoint),
            api_path: raw.api_path.unwrap_or(defaults.api_path),
            api_key: raw.api_key.or(defaults.api_key),
            model: raw.model.unwrap_or(defaults.model),
        }
    }
}
