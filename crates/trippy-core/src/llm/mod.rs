//! LLM integration module
//!
//! Provides multi-provider LLM support with streamed chat. Streamed text is
//! written into a [`crate::relay::TextSink`] as it arrives.
//!
//! Supported providers:
//! - Gemini (Google AI), the default
//! - OpenAI
//! - Ollama (local inference)

mod error;
mod gemini;
mod message;
mod ollama;
mod openai;
mod provider;

#[cfg(test)]
mod testing;

pub use error::LlmError;
pub use message::{ChatMessage, Role};
pub use provider::{build_provider, LlmProvider, ModelSelection, SharedProvider};

// Provider implementations
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
