// Config loading tests - AppConfig::load validation and defaults

use open_agent_core::config::{AppConfig, ConfigError};
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("agent.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn returns_error_when_file_not_found() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/agent.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn returns_error_when_toml_is_invalid() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "[[servers]\nname = ");

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn returns_error_when_no_servers_configured() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
system_prompt = "be brief"

[agent]
max_iterations = 5
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::NoServersConfigured)));
}

#[test]
fn rejects_duplicate_server_names() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[[servers]]
name = "notion"
command = "npx"

[[servers]]
name = "notion"
command = "uvx"
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::DuplicateServer { name }) if name == "notion"));
}

#[test]
fn rejects_server_names_containing_separator() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[[servers]]
name = "my__server"
command = "npx"
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::InvalidServerName { .. })));
}

#[test]
fn rejects_server_names_ending_with_underscore() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[[servers]]
name = "notion_"
command = "npx"
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(
        matches!(result, Err(ConfigError::InvalidServerName { name, .. }) if name == "notion_")
    );
}

#[test]
fn rejects_zero_iterations() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[agent]
max_iterations = 0

[[servers]]
name = "notion"
command = "npx"
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidAgentSetting {
            field: "max_iterations",
            ..
        })
    ));
}

#[test]
fn applies_defaults_for_missing_sections() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
system_prompt = "   "

[[servers]]
name = "notion"
command = "npx"
args = ["-y", "mcp-remote", "https://mcp.notion.com/mcp"]
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("config");
    assert_eq!(config.system_prompt, None);
    assert_eq!(config.servers.len(), 1);
    assert_eq!(config.servers[0].args.len(), 3);
    assert_eq!(config.agent.max_iterations, 10);
    assert_eq!(config.agent.max_result_chars, 8000);
    assert_eq!(
        config.agent.retry_delays,
        vec![Duration::from_millis(500), Duration::from_millis(1000)]
    );
    assert_eq!(config.provider.api_path, "/chat/completions");
    assert_eq!(config.provider.api_key.as_deref(), Some("FIREWORKS_API_KEY"));
}

#[test]
fn reads_provider_and_agent_overrides() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[provider]
endpoint = "http://127.0.0.1:8000/v1"
api_key = "LOCAL_KEY"
model = "qwen2.5"

[agent]
max_iterations = 3
max_result_chars = 100
retry_delays_ms = []

[[servers]]
name = "files"
command = "mcp-files"
env = { ROOT = "/srv" }
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("config");
    assert_eq!(config.provider.endpoint, "http://127.0.0.1:8000/v1");
    assert_eq!(config.provider.model, "qwen2.5");
    assert_eq!(config.agent.max_iterations, 3);
    assert_eq!(config.agent.max_result_chars, 100);
    assert!(config.agent.retry_delays.is_empty());
    assert_eq!(
        config.servers[0].env.get("ROOT").map(String::as_str),
        Some("/srv")
    );
}

#[test]
#[serial]
fn expands_default_values_in_server_args() {
    unsafe {
        std::env::remove_var("OPEN_AGENT_UNSET_URL");
    }
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[[servers]]
name = "notion"
command = "npx"
args = ["mcp-remote", "${OPEN_AGENT_UNSET_URL:-https://mcp.notion.com/mcp}"]
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("config");
    assert_eq!(config.servers[0].args[1], "https://mcp.notion.com/mcp");
}
