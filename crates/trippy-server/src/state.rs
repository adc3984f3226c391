//! Server state management

use trippy_core::config::ConfigError;
use trippy_core::{ChunkRenderer, OrchestrationInvoker, Orchestrator, TravelCrew, TrippyConfig};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TrippyConfig>,
    pub orchestrator: Arc<dyn Orchestrator>,

    /// Compiled `[relay]` patterns, cloned into each run
    pub renderer: ChunkRenderer,
}

impl AppState {
    /// State backed by the travel crew
    pub fn new(config: TrippyConfig) -> Result<Self, ConfigError> {
        let crew = TravelCrew::new(config.llm.clone());
        Self::with_orchestrator(config, Arc::new(crew))
    }

    pub fn with_orchestrator(
        config: TrippyConfig,
        orchestrator: Arc<dyn Orchestrator>,
    ) -> Result<Self, ConfigError> {
        let renderer = ChunkRenderer::from_config(&config.relay)?;
        Ok(Self {
            config: Arc::new(config),
            orchestrator,
            renderer,
        })
    }

    /// A fresh invoker for one submission
    pub fn invoker(&self) -> OrchestrationInvoker {
        OrchestrationInvoker::new(Arc::clone(&self.orchestrator), self.config.llm.model.as_str())
    }
}
