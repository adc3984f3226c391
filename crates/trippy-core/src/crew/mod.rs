//! Orchestration collaborator
//!
//! The invoker treats the multi-agent engine as opaque: it hands over
//! [`CrewInputs`] and a [`TextSink`] to print into, and gets back final text
//! or an error. [`TravelCrew`] is the default engine: three agents running
//! three sequential tasks against an LLM provider.

mod roles;
mod travel;

pub use roles::{AgentSpec, TaskSpec};
pub use travel::TravelCrew;

use crate::relay::TextSink;
use crate::trip::TripRequest;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Everything the collaborator consumes for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewInputs {
    pub origin: String,

    /// Destination candidates, as typed by the user
    pub cities: String,

    pub interests: String,

    /// `YYYY-MM-DD to YYYY-MM-DD`
    pub date_range: String,

    /// `<provider>/<model>`
    pub model: String,
}

impl CrewInputs {
    pub fn from_request(request: &TripRequest, model: &str) -> Self {
        Self {
            origin: request.origin.clone(),
            cities: request.destination.clone(),
            interests: request.interests.clone(),
            date_range: request.date_range(),
            model: model.to_string(),
        }
    }
}

/// A blocking multi-agent engine
pub trait Orchestrator: Send + Sync {
    /// Run to completion, printing progress into `output`
    fn kickoff(&self, inputs: &CrewInputs, output: &mut dyn TextSink) -> Result<String>;
}

impl<F> Orchestrator for F
where
    F: Fn(&CrewInputs, &mut dyn TextSink) -> Result<String> + Send + Sync,
{
    fn kickoff(&self, inputs: &CrewInputs, output: &mut dyn TextSink) -> Result<String> {
        self(inputs, output)
    }
}
