//! Configuration module for Trippy
//!
//! Handles loading and parsing of `.trippy.toml` configuration files
//! with support for environment variable expansion.

mod loader;
mod types;

pub use loader::{
    load_config, load_from_file, sample_config, user_config_path, validate, ConfigError,
};
pub use types::{LlmConfig, ProviderConfig, RelayConfig, ServerConfig, TrippyConfig};
