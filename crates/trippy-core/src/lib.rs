//! Trippy Core - Backend library for the Trippy travel planner
//!
//! This crate provides the UI-agnostic backend functionality:
//! - Relay sink and chunk renderer for streaming producer output
//! - Trip requests built from form input
//! - The orchestration invoker (`Idle → Running → Succeeded | Failed`)
//! - The travel crew collaborator and its LLM providers (Gemini, OpenAI, Ollama)
//! - Configuration loading
//!
//! Any UI (web page, terminal) consumes this crate by supplying a
//! [`ProgressView`] and reading the [`Outcome`] of an invocation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  TripRequest   ┌────────────────────┐  kickoff   ┌─────────────┐
//! │   Any UI     │ ──────────────→│ OrchestrationInvoker│──────────→│ Orchestrator│
//! │ (web, term)  │                │                    │            │ (TravelCrew)│
//! │              │ ←──────────────│  RelaySink ← write ─────────────│             │
//! └──────────────┘  RenderedView  └────────────────────┘            └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use trippy_core::{OrchestrationInvoker, RelaySink, ChunkRenderer, TripRequest};
//!
//! let mut invoker = OrchestrationInvoker::new(orchestrator, "gemini/gemini-2.0-flash");
//! let mut relay = RelaySink::new(ChunkRenderer::default(), my_view);
//! match invoker.invoke(request, &mut relay) {
//!     Ok(plan) => println!("{}", plan.markdown),
//!     Err(failure) => eprintln!("{}", failure),
//! }
//! ```

pub mod config;
pub mod error;
pub mod markdown;
pub mod notifications;
pub mod trip;

// Streaming progress relay
pub mod relay;

// LLM provider system
pub mod llm;

// Orchestration collaborator (the travel crew)
pub mod crew;

// Orchestration driver
pub mod invoker;

pub use config::{LlmConfig, ProviderConfig, RelayConfig, ServerConfig, TrippyConfig};
pub use error::{Result, TrippyError};
pub use notifications::{Notification, RunState};
pub use trip::{DateRange, TripForm, TripRequest};

pub use relay::{
    ChunkRenderer, DisplaySegment, NotificationView, NullSink, ProgressView, RelaySink,
    RenderedView, TextSink, TracingSink,
};

pub use llm::{ChatMessage, LlmError, LlmProvider, ModelSelection, SharedProvider};

pub use crew::{CrewInputs, Orchestrator, TravelCrew};

pub use invoker::{
    InvokerState, OrchestrationFailure, OrchestrationInvoker, Outcome, TripPlan,
};

/// Get the crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
