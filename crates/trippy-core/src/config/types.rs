//! Configuration types for Trippy
//!
//! Defines the structure of `.trippy.toml` configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrippyConfig {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Relay cosmetics (markers and patterns applied to producer output)
    #[serde(default)]
    pub relay: RelayConfig,

    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// LLM configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model selection as `<provider>/<model>` (e.g. `gemini/gemini-2.0-flash`)
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Provider configurations
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_model() -> String {
    "gemini/gemini-2.0-flash".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            timeout: default_timeout(),
            temperature: default_temperature(),
            providers: default_providers(),
        }
    }
}

/// Individual provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// API key (supports ${ENV_VAR} syntax)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for the API
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
        }
    }
}

/// Create default provider configurations
fn default_providers() -> HashMap<String, ProviderConfig> {
    let mut providers = HashMap::new();

    providers.insert(
        "gemini".to_string(),
        ProviderConfig {
            enabled: true,
            api_key: None,
            base_url: Some("https://generativelanguage.googleapis.com".to_string()),
        },
    );

    providers.insert(
        "openai".to_string(),
        ProviderConfig {
            enabled: true,
            api_key: None,
            base_url: Some("https://api.openai.com/v1".to_string()),
        },
    );

    // Ollama - local, no API key needed
    providers.insert(
        "ollama".to_string(),
        ProviderConfig {
            enabled: true,
            api_key: None,
            base_url: Some("http://localhost:11434".to_string()),
        },
    );

    providers
}

/// Relay cosmetics
///
/// The patterns are regular expressions matched against producer output.
/// They depend on the exact formatting of the collaborator, so they live in
/// configuration rather than in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Removed from the text before rendering
    #[serde(default = "default_strip_patterns")]
    pub strip_patterns: Vec<String>,

    /// A line matching any of these starts a new display segment. The first
    /// capture group, if any, becomes the heading text.
    #[serde(default = "default_step_markers")]
    pub step_markers: Vec<String>,

    /// A line matching any of these raises a "task started" toast using the
    /// first capture group.
    #[serde(default = "default_task_patterns")]
    pub task_patterns: Vec<String>,

    /// Heading accent colours, cycled per step
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
}

fn default_strip_patterns() -> Vec<String> {
    vec![r"\x1B\[[0-9;]*[mK]".to_string()]
}

fn default_step_markers() -> Vec<String> {
    vec![
        r"^\s*#\s*Agent:\s*(.+?)\s*$".to_string(),
        r"Entering new CrewAgentExecutor chain".to_string(),
    ]
}

fn default_task_patterns() -> Vec<String> {
    vec![
        r#"(?i)"task"\s*:\s*"(.*?)""#.to_string(),
        r"(?i)^\s*#*\s*task\s*:\s*(.+)$".to_string(),
    ]
}

fn default_palette() -> Vec<String> {
    ["red", "green", "blue", "orange"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            strip_patterns: default_strip_patterns(),
            step_markers: default_step_markers(),
            task_patterns: default_task_patterns(),
            palette: default_palette(),
        }
    }
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Open the form page in a browser on startup
    #[serde(default = "default_enabled")]
    pub open_browser: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            open_browser: true,
        }
    }
}

impl TrippyConfig {
    /// Get a provider config by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.llm.providers.get(name)
    }
}
