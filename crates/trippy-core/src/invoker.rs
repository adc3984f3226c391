//! Orchestration invoker
//!
//! Drives exactly one collaborator run per submission:
//!
//! ```text
//! Idle ──invoke──→ Running ──Ok──→ Succeeded
//!                          └─Err/panic─→ Failed
//! ```
//!
//! While running, collaborator output goes to the caller's relay. The relay
//! is only borrowed for the run, so nothing the collaborator keeps can write
//! to it afterwards.

use crate::crew::{CrewInputs, Orchestrator};
use crate::markdown;
use crate::relay::{ProgressView, RelaySink, TextSink, TracingSink};
use crate::trip::TripRequest;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Invoker lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvokerState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Final output of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripPlan {
    pub markdown: String,
}

impl TripPlan {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
        }
    }

    pub fn to_html(&self) -> String {
        markdown::to_html(&self.markdown)
    }
}

/// The one user-visible failure kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("🚨 Oops! Something went wrong: {message}")]
pub struct OrchestrationFailure {
    message: String,
}

impl OrchestrationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The underlying failure text
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result of one invocation
pub type Outcome = std::result::Result<TripPlan, OrchestrationFailure>;

/// Collaborator output for one run: the caller's relay, with every complete
/// line also copied to the log transcript
///
/// Holds the relay by `&mut`, so it is handed back to the caller as soon as
/// the run returns, whatever the outcome.
struct RunOutput<'a> {
    relay: &'a mut dyn TextSink,
    transcript: TracingSink,
}

impl<'a> RunOutput<'a> {
    fn new(relay: &'a mut dyn TextSink) -> Self {
        Self {
            relay,
            transcript: TracingSink::new(),
        }
    }
}

impl TextSink for RunOutput<'_> {
    fn write(&mut self, text: &str) -> usize {
        self.transcript.write(text);
        self.relay.write(text)
    }

    fn flush(&mut self) {
        self.transcript.flush();
        self.relay.flush();
    }

    fn label(&self) -> &str {
        self.relay.label()
    }
}

type StateListener = Box<dyn FnMut(InvokerState) + Send>;

/// Runs the collaborator for one trip request at a time
pub struct OrchestrationInvoker {
    orchestrator: Arc<dyn Orchestrator>,

    /// `<provider>/<model>` handed to the collaborator
    model: String,

    state: InvokerState,

    listener: Option<StateListener>,
}

impl OrchestrationInvoker {
    pub fn new(orchestrator: Arc<dyn Orchestrator>, model: impl Into<String>) -> Self {
        Self {
            orchestrator,
            model: model.into(),
            state: InvokerState::Idle,
            listener: None,
        }
    }

    /// Observe every state transition
    pub fn on_state(mut self, listener: impl FnMut(InvokerState) + Send + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn state(&self) -> InvokerState {
        self.state
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run the collaborator for `request`, relaying its output into `relay`
    ///
    /// Never panics and never returns an error other than
    /// [`OrchestrationFailure`]; nothing is retried.
    pub fn invoke<V: ProgressView>(
        &mut self,
        request: TripRequest,
        relay: &mut RelaySink<V>,
    ) -> Outcome {
        let inputs = CrewInputs::from_request(&request, &self.model);
        relay.reset();
        self.transition(InvokerState::Running);
        tracing::info!(
            origin = %request.origin,
            destination = %request.destination,
            dates = %request.dates,
            model = %self.model,
            "Orchestration started"
        );

        let result = {
            let mut output = RunOutput::new(relay);
            let orchestrator = &self.orchestrator;
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                orchestrator.kickoff(&inputs, &mut output)
            }));
            output.flush();
            result
        };

        let outcome = match result {
            Ok(Ok(text)) => Ok(TripPlan::new(text)),
            Ok(Err(e)) => Err(OrchestrationFailure::new(e.to_string())),
            Err(payload) => Err(OrchestrationFailure::new(panic_message(payload.as_ref()))),
        };

        match &outcome {
            Ok(plan) => {
                tracing::info!(chars = plan.markdown.len(), "Orchestration succeeded");
                self.transition(InvokerState::Succeeded);
            }
            Err(failure) => {
                tracing::warn!(error = %failure.message(), "Orchestration failed");
                self.transition(InvokerState::Failed);
            }
        }

        outcome
    }

    fn transition(&mut self, next: InvokerState) {
        tracing::debug!(from = ?self.state, to = ?next, "Invoker state");
        self.state = next;
        if let Some(listener) = self.listener.as_mut() {
            listener(next);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "the orchestration engine panicked".to_string()
    }
}
