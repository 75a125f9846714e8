use crate::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_RESULT_CHARS, DEFAULT_RETRY_DELAYS_MS};
use serde::Deserialize;
use std::time::Duration;

/// Tunables of the agent loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub max_iterations: usize,
    pub max_result_chars: usize,
    pub retry_delays: Vec<Duration>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_result_chars: DEFAULT_MAX_RESULT_CHARS,
            retry_delays: DEFAULT_RETRY_DELAYS_MS
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct RawAgentSettings {
    pub(crate) max_iterations: Option<usize>,
    max_result_chars: Option<usize>,
    retry_delays_ms: Option<Vec<u64>>,
}

impl From<RawAgentSettings> for AgentSettings {
    fn from(raw: RawAgentSettings) -> Self {
        let defaults = AgentSettings::default();
        Self {
            max_iterations: raw.max_iterations.unwrap_or(defaults.max_iterations),
            max_result_chars: raw.max_result_chars.unwrap_or(defaults.max_result_chars),
            retry_delays: raw
                .retry_delays_ms
                .map(|delays| delays.into_iter().map(Duration::from_millis).collect())
                .unwrap_or(defaults.retry_delays),
        }
    }
}
