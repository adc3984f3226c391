//! API route handlers

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use trippy_core::{Notification, RelaySink, RenderedView, TripForm, TrippyError};

use crate::session::PlanSession;
use crate::state::AppState;

/// Errors surfaced by the JSON plan endpoint
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("{0}")]
    InvalidForm(TrippyError),

    #[error("{0}")]
    Failed(String),

    #[error("plan worker stopped: {0}")]
    Worker(String),
}

impl IntoResponse for PlanError {
    fn into_response(self) -> Response {
        let status = match &self {
            PlanError::InvalidForm(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlanError::Failed(_) => StatusCode::BAD_GATEWAY,
            PlanError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(serde_json::json!({
                "status": "error",
                "message": self.to_string()
            })),
        )
            .into_response()
    }
}

// ========== Page ==========

pub async fn index() -> impl IntoResponse {
    Html(crate::page::render(chrono::Local::now().date_naive()))
}

// ========== Plan Routes ==========

/// Plan a trip in one blocking request
pub async fn plan(
    State(state): State<AppState>,
    Json(form): Json<TripForm>,
) -> Result<impl IntoResponse, PlanError> {
    let request = form.into_request().map_err(PlanError::InvalidForm)?;
    tracing::info!(destination = %request.destination, "Plan requested");

    let renderer = state.renderer.clone();
    let mut invoker = state.invoker();
    let (outcome, progress) = tokio::task::spawn_blocking(move || {
        let mut relay = RelaySink::new(renderer, |_: &RenderedView| {});
        let outcome = invoker.invoke(request, &mut relay);
        (outcome, relay.rendered().to_markdown())
    })
    .await
    .map_err(|e| PlanError::Worker(e.to_string()))?;

    let plan = outcome.map_err(|failure| PlanError::Failed(failure.to_string()))?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "markdown": plan.markdown,
        "html": plan.to_html(),
        "progress": progress
    })))
}

/// Messages the page sends over the WebSocket
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ClientMessage {
    Submit(TripForm),
}

pub async fn plan_websocket(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

async fn handle_websocket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();
    let mut session = PlanSession::new(state, tx.clone());

    tracing::info!(session = %session.id(), "WebSocket connected");

    let _ = sender
        .send(Message::Text(
            serde_json::json!({
                "type": "Connected",
                "session": session.id().to_string()
            })
            .to_string(),
        ))
        .await;

    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!("Received: {}", text);
                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::Submit(form)) => match form.into_request() {
                            Ok(request) => session.submit(request),
                            Err(e) => {
                                let _ = tx.send(Notification::Failed { message: e.to_string() });
                            }
                        },
                        Err(e) => {
                            let _ = tx.send(Notification::Failed {
                                message: format!("Invalid message: {}", e),
                            });
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!(session = %session.id(), "WebSocket closed");
                    break;
                }
                Some(Err(e)) => {
                    tracing::warn!(session = %session.id(), "WebSocket error: {}", e);
                    break;
                }
                Some(Ok(_)) => {}
            },
            Some(notification) = rx.recv() => {
                if sender.send(Message::Text(notification.to_json())).await.is_err() {
                    tracing::debug!(session = %session.id(), "Page went away");
                    break;
                }
            }
        }
    }
}
