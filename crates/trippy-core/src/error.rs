//! Error types for Trippy Core
//!
//! Provides a unified error type for backend operations. The single
//! user-visible failure kind lives in [`crate::invoker::OrchestrationFailure`];
//! everything here collapses into it at the invoker boundary.

use thiserror::Error;

/// Result type for Trippy Core operations
pub type Result<T> = std::result::Result<T, TrippyError>;

/// Unified error type for Trippy Core
#[derive(Error, Debug)]
pub enum TrippyError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] crate::llm::LlmError),

    /// Form input that cannot become a trip request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The orchestration collaborator failed
    #[error("Orchestration error: {0}")]
    Orchestration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TrippyError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        TrippyError::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        TrippyError::InvalidInput(msg.into())
    }

    /// Create an orchestration error
    pub fn orchestration(msg: impl Into<String>) -> Self {
        TrippyError::Orchestration(msg.into())
    }
}

impl From<serde_json::Error> for TrippyError {
    fn from(err: serde_json::Error) -> Self {
        TrippyError::Serialization(err.to_string())
    }
}

impl From<crate::config::ConfigError> for TrippyError {
    fn from(err: crate::config::ConfigError) -> Self {
        TrippyError::Config(err.to_string())
    }
}
