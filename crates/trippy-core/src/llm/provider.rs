//! LLM provider trait and construction from configuration

use super::{ChatMessage, GeminiProvider, LlmError, OllamaProvider, OpenAIProvider};
use crate::config::LlmConfig;
use crate::relay::TextSink;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// LLM provider trait
///
/// Defines the interface for LLM providers (Gemini, OpenAI, Ollama).
pub trait LlmProvider: Send + Sync {
    /// Get the provider's unique identifier (e.g., "gemini", "ollama")
    fn id(&self) -> &str;

    /// Get the model this provider talks to
    fn model(&self) -> &str;

    /// Run a chat completion
    ///
    /// Text is written to `output` as it streams in; the complete response is
    /// returned once the stream ends.
    fn chat(&self, messages: &[ChatMessage], output: &mut dyn TextSink)
        -> Result<String, LlmError>;
}

/// Thread-safe shared provider
pub type SharedProvider = Arc<dyn LlmProvider>;

/// A `<provider>/<model>` selection such as `gemini/gemini-2.0-flash`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub provider: String,
    pub model: String,
}

impl ModelSelection {
    pub fn parse(selection: &str) -> Result<Self, LlmError> {
        match selection.trim().split_once('/') {
            Some((provider, model)) if !provider.is_empty() && !model.is_empty() => Ok(Self {
                provider: provider.to_lowercase(),
                model: model.to_string(),
            }),
            _ => Err(LlmError::InvalidRequest(format!(
                "model selection `{}` must look like <provider>/<model>",
                selection
            ))),
        }
    }
}

impl fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Build the provider for `selection` from the `[llm]` configuration
pub fn build_provider(
    config: &LlmConfig,
    selection: &ModelSelection,
) -> Result<SharedProvider, LlmError> {
    let provider_config = config
        .providers
        .get(&selection.provider)
        .filter(|p| p.enabled)
        .ok_or_else(|| {
            LlmError::ProviderUnavailable(format!(
                "{} is not configured or not enabled",
                selection.provider
            ))
        })?;

    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(config.timeout))
        .build();

    let api_key = provider_config.api_key.clone().unwrap_or_default();
    let base_url = provider_config.base_url.clone();
    let requires_key = |id: &str| {
        if api_key.is_empty() || api_key.starts_with("${") {
            Err(LlmError::ProviderUnavailable(format!(
                "No API key configured for {}",
                id
            )))
        } else {
            Ok(())
        }
    };

    let provider: SharedProvider = match selection.provider.as_str() {
        "gemini" => {
            requires_key("gemini")?;
            let mut provider = GeminiProvider::new(agent, &api_key, &selection.model)
                .with_temperature(config.temperature);
            if let Some(url) = base_url {
                provider = provider.with_base_url(&url);
            }
            Arc::new(provider)
        }
        "openai" => {
            requires_key("openai")?;
            let mut provider = OpenAIProvider::new(agent, &api_key, &selection.model)
                .with_temperature(config.temperature);
            if let Some(url) = base_url {
                provider = provider.with_base_url(&url);
            }
            Arc::new(provider)
        }
        "ollama" => {
            let url = base_url.unwrap_or_else(|| "http://localhost:11434".to_string());
            Arc::new(OllamaProvider::new(agent, &url, &selection.model))
        }
        other => {
            return Err(LlmError::ProviderUnavailable(format!(
                "Unsupported provider: {}",
                other
            )))
        }
    };

    tracing::debug!(provider = provider.id(), model = provider.model(), "Built LLM provider");
    Ok(provider)
}
