//! One page session's planning runs
//!
//! A run executes on a blocking worker and reports back through an unbounded
//! channel as [`Notification`]s, in the order the page should apply them:
//! status, then progress/toasts as the crew prints, then the outcome.

use crate::state::AppState;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use trippy_core::{
    InvokerState, Notification, NotificationView, OrchestrationFailure, RelaySink, TripRequest,
};
use uuid::Uuid;

/// Tracks the run belonging to one WebSocket session
pub struct PlanSession {
    id: Uuid,
    state: AppState,
    notify: UnboundedSender<Notification>,
    running: Option<JoinHandle<()>>,
}

impl PlanSession {
    pub fn new(state: AppState, notify: UnboundedSender<Notification>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state,
            notify,
            running: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether a run is still executing
    pub fn is_busy(&self) -> bool {
        self.running.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Start a run, or refuse with a failure notice if one is in flight
    pub fn submit(&mut self, request: TripRequest) {
        if self.is_busy() {
            tracing::warn!(session = %self.id, "Submission rejected, run in progress");
            let busy = OrchestrationFailure::new("busy: a trip plan is already being prepared");
            let _ = self.notify.send(Notification::failed(&busy));
            return;
        }

        let state = self.state.clone();
        let notify = self.notify.clone();
        let session = self.id;
        self.running = Some(tokio::task::spawn_blocking(move || {
            tracing::info!(%session, "Plan run started");
            run_plan(&state, request, notify);
        }));
    }
}

/// Run one invocation to completion, reporting every step to `notify`
///
/// Blocking; call from a worker thread.
pub fn run_plan(state: &AppState, request: TripRequest, notify: UnboundedSender<Notification>) {
    let send = |n: Notification| {
        let _ = notify.send(n);
    };

    let progress = notify.clone();
    let view = NotificationView::new(move |n| {
        let _ = progress.send(n);
    });
    let mut relay = RelaySink::new(state.renderer.clone(), view);

    let mut invoker = state.invoker().on_state(|s| {
        if s == InvokerState::Running {
            tracing::debug!("Invoker running");
        }
    });

    send(Notification::gathering());
    match invoker.invoke(request, &mut relay) {
        Ok(plan) => {
            send(Notification::completed(&plan));
            send(Notification::ready());
        }
        Err(failure) => {
            send(Notification::failed(&failure));
            send(Notification::errored());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use trippy_core::{CrewInputs, DateRange, RunState, TextSink, TrippyConfig, TrippyError};

    fn request() -> TripRequest {
        TripRequest::new(
            "San Mateo, CA",
            "Bali, Indonesia",
            DateRange::new(
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            ),
            "hiking",
        )
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = rx.try_recv() {
            out.push(n);
        }
        out
    }

    #[test]
    fn test_run_plan_success_sequence() {
        let crew = |_: &CrewInputs, out: &mut dyn TextSink| -> trippy_core::Result<String> {
            out.write("# Agent: City Selection Expert\n## Task: Pick a city\n");
            Ok("Day 1: beach".to_string())
        };
        let state = AppState::with_orchestrator(TrippyConfig::default(), Arc::new(crew)).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        run_plan(&state, request(), tx);
        let notes = drain(&mut rx);

        assert_eq!(notes.first(), Some(&Notification::gathering()));
        assert!(notes.contains(&Notification::Toast {
            message: "🤖 Pick a city".to_string()
        }));
        assert!(notes.iter().any(|n| matches!(
            n,
            Notification::Progress { html, .. } if html.contains("City Selection Expert")
        )));
        match &notes[notes.len() - 2] {
            Notification::Completed { markdown, .. } => assert_eq!(markdown, "Day 1: beach"),
            other => panic!("expected Completed, got {:?}", other),
        }
        assert_eq!(notes.last(), Some(&Notification::ready()));
    }

    #[test]
    fn test_run_plan_failure_sequence() {
        let crew = |_: &CrewInputs, _: &mut dyn TextSink| -> trippy_core::Result<String> {
            Err(TrippyError::orchestration("rate limited"))
        };
        let state = AppState::with_orchestrator(TrippyConfig::default(), Arc::new(crew)).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        run_plan(&state, request(), tx);
        let notes = drain(&mut rx);

        assert!(!notes
            .iter()
            .any(|n| matches!(n, Notification::Completed { .. })));
        match &notes[notes.len() - 2] {
            Notification::Failed { message } => assert!(message.contains("rate limited")),
            other => panic!("expected Failed, got {:?}", other),
        }
        assert!(matches!(
            notes.last(),
            Some(Notification::Status {
                state: RunState::Error,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_second_submit_while_busy_is_rejected() {
        let (gate_tx, gate_rx) = std::sync::mpsc::channel::<()>();
        let gate_rx = std::sync::Mutex::new(gate_rx);
        let crew = move |_: &CrewInputs, _: &mut dyn TextSink| -> trippy_core::Result<String> {
            let _ = gate_rx.lock().unwrap().recv();
            Ok("done".to_string())
        };
        let state = AppState::with_orchestrator(TrippyConfig::default(), Arc::new(crew)).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = PlanSession::new(state, tx);

        session.submit(request());
        assert!(session.is_busy());
        session.submit(request());

        // The rejection arrives while the first run is still blocked
        let mut rejected = false;
        while let Some(n) = rx.recv().await {
            if let Notification::Failed { message } = &n {
                assert!(message.contains("busy"));
                rejected = true;
                break;
            }
        }
        assert!(rejected);

        gate_tx.send(()).unwrap();
        while let Some(n) = rx.recv().await {
            if n == Notification::ready() {
                break;
            }
        }
    }
}
