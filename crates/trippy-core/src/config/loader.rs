//! Configuration loader with environment variable expansion
//!
//! Loads configuration from `.trippy.toml` in the project root or the user
//! config directory.

use super::types::{ProviderConfig, TrippyConfig};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid relay pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Load configuration from various sources
///
/// Priority order:
/// 1. Project-level `.trippy.toml`
/// 2. User-level `~/.config/trippy/config.toml`
/// 3. Default configuration
///
/// Environment overrides are applied on top of whichever source wins.
pub fn load_config(project_dir: &Path) -> Result<TrippyConfig, ConfigError> {
    let project_config = project_dir.join(".trippy.toml");
    if project_config.exists() {
        return load_from_file(&project_config);
    }

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            return load_from_file(&user_config);
        }
    }

    let config = apply_env_overrides(TrippyConfig::default())?;
    validate(&config)?;
    Ok(config)
}

/// Get user config file path
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("trippy").join("config.toml"))
}

/// Load configuration from a specific file
pub fn load_from_file(path: &Path) -> Result<TrippyConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: TrippyConfig = toml::from_str(&content)?;

    expand_env_vars(&mut config);
    let config = apply_env_overrides(config)?;
    validate(&config)?;

    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Check that every relay pattern compiles
pub fn validate(config: &TrippyConfig) -> Result<(), ConfigError> {
    let relay = &config.relay;
    for pattern in relay
        .strip_patterns
        .iter()
        .chain(&relay.step_markers)
        .chain(&relay.task_patterns)
    {
        if let Err(e) = Regex::new(pattern) {
            return Err(ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            });
        }
    }
    Ok(())
}

fn env_regex() -> &'static Regex {
    static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
    ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

/// Expand ${VAR} patterns in string values
fn expand_env_vars(config: &mut TrippyConfig) {
    for provider in config.llm.providers.values_mut() {
        if let Some(ref api_key) = provider.api_key {
            provider.api_key = Some(expand_string(api_key));
        }
        if let Some(ref base_url) = provider.base_url {
            provider.base_url = Some(expand_string(base_url));
        }
    }
}

/// Expand environment variables in a single string
///
/// Unknown variables are left as written.
fn expand_string(s: &str) -> String {
    env_regex()
        .replace_all(s, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}

/// Apply environment variable overrides for common settings
///
/// Supports direct environment variables:
/// - GEMINI_API_KEY / GOOGLE_API_KEY -> gemini.api_key
/// - OPENAI_API_KEY -> openai.api_key
/// - OLLAMA_BASE_URL -> ollama.base_url
/// - TRIPPY_MODEL -> llm.model
/// - PORT -> server.port
fn apply_env_overrides(mut config: TrippyConfig) -> Result<TrippyConfig, ConfigError> {
    for env_var in ["GEMINI_API_KEY", "GOOGLE_API_KEY"] {
        if let Some(key) = non_empty_env(env_var) {
            provider_entry(&mut config, "gemini").api_key = Some(key);
            break;
        }
    }

    if let Some(key) = non_empty_env("OPENAI_API_KEY") {
        provider_entry(&mut config, "openai").api_key = Some(key);
    }

    if let Some(url) = non_empty_env("OLLAMA_BASE_URL") {
        provider_entry(&mut config, "ollama").base_url = Some(url);
    }

    if let Some(model) = non_empty_env("TRIPPY_MODEL") {
        config.llm.model = model;
    }

    if let Some(port) = non_empty_env("PORT") {
        config.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
            key: "PORT".to_string(),
            value: port.clone(),
        })?;
    }

    Ok(config)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn provider_entry<'a>(config: &'a mut TrippyConfig, id: &str) -> &'a mut ProviderConfig {
    config
        .llm
        .providers
        .entry(id.to_string())
        .or_insert_with(ProviderConfig::default)
}

/// Create a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Trippy Configuration
# Place this file in your project root as .trippy.toml
# or in ~/.config/trippy/config.toml for global settings

[llm]
# <provider>/<model>; providers: gemini, openai, ollama
model = "gemini/gemini-2.0-flash"

# Request timeout in seconds
timeout = 120
temperature = 0.7

[llm.providers.gemini]
api_key = "${GEMINI_API_KEY}"

[llm.providers.openai]
api_key = "${OPENAI_API_KEY}"

[llm.providers.ollama]
base_url = "http://localhost:11434"

[relay]
# Regular expressions applied to the crew's console output
strip_patterns = ['\x1B\[[0-9;]*[mK]']
step_markers = ['^\s*#\s*Agent:\s*(.+?)\s*$', 'Entering new CrewAgentExecutor chain']
task_patterns = ['(?i)"task"\s*:\s*"(.*?)"', '(?i)^\s*#*\s*task\s*:\s*(.+)$']
palette = ["red", "green", "blue", "orange"]

[server]
host = "127.0.0.1"
port = 8080
open_browser = true
"#
}
