//! Notifications that the Trippy backend sends to any UI
//!
//! They are serializable for the web page, which receives them over a
//! WebSocket as JSON objects tagged by `type`.

use crate::invoker::{OrchestrationFailure, TripPlan};
use crate::relay::DisplaySegment;
use serde::{Deserialize, Serialize};

/// State shown by the page's status widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Complete,
    Error,
}

/// Notifications that the backend sends to any UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    /// Status widget update
    Status {
        /// Text shown next to the spinner
        label: String,

        state: RunState,
    },

    /// A task started inside the crew
    Toast { message: String },

    /// Full re-render of the progress region
    Progress {
        /// Rendered HTML of all segments
        html: String,

        /// Structured segments, for clients that render on their own
        segments: Vec<DisplaySegment>,
    },

    /// The final travel plan
    Completed {
        /// Plan text as returned by the crew
        markdown: String,

        /// Plan rendered to HTML
        html: String,
    },

    /// The single user-visible failure kind
    Failed { message: String },
}

impl Notification {
    pub fn gathering() -> Self {
        Notification::Status {
            label: "🔍 Gathering your trip details...".to_string(),
            state: RunState::Running,
        }
    }

    pub fn ready() -> Self {
        Notification::Status {
            label: "✅ Your trip plan is ready!".to_string(),
            state: RunState::Complete,
        }
    }

    pub fn errored() -> Self {
        Notification::Status {
            label: "Trip planning failed".to_string(),
            state: RunState::Error,
        }
    }

    pub fn completed(plan: &TripPlan) -> Self {
        Notification::Completed {
            markdown: plan.markdown.clone(),
            html: plan.to_html(),
        }
    }

    pub fn failed(failure: &OrchestrationFailure) -> Self {
        Notification::Failed {
            message: failure.to_string(),
        }
    }

    /// Serialize for the wire
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({ "type": "Failed", "message": e.to_string() }).to_string()
        })
    }
}
