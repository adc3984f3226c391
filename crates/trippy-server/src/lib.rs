//! Trippy Server Library
//!
//! Serves the trip form page and runs plans for it: blocking over
//! `POST /api/plan`, streamed over the `/api/plan/ws` WebSocket.

pub mod page;
pub mod routes;
pub mod session;
pub mod state;

use axum::{
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Once;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trippy_core::TrippyConfig;

pub use session::{run_plan, PlanSession};
pub use state::AppState;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber (only once)
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| {
                    "trippy_server=debug,trippy_core=info,tower_http=debug".into()
                }),
            ))
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}

/// Build the Axum router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        // API routes
        .route("/api/health", get(health_check))
        .route("/api/plan", post(routes::plan))
        .route("/api/plan/ws", get(routes::plan_websocket))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the Trippy web server until the process is killed
pub async fn run_server(config: TrippyConfig) -> anyhow::Result<()> {
    serve(config, std::future::pending()).await
}

/// Run the Trippy web server until `shutdown` resolves
pub async fn serve(
    config: TrippyConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting Trippy Server...");

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    let addr = listener.local_addr()?;

    let state = AppState::new(config)?;
    let app = build_router(state);

    tracing::info!("Listening on http://{}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/api/plan/ws", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": trippy_core::version()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tower::ServiceExt;
    use trippy_core::{CrewInputs, TextSink, TrippyError};

    fn router() -> Router {
        let crew = |inputs: &CrewInputs, out: &mut dyn TextSink| -> trippy_core::Result<String> {
            out.write("# Agent: Amazing Travel Concierge\n");
            if inputs.cities.contains("Nowhere") {
                return Err(TrippyError::orchestration("rate limited"));
            }
            Ok(format!("# Trip to {}\n\nDay 1: ...", inputs.cities))
        };
        let state = AppState::with_orchestrator(TrippyConfig::default(), Arc::new(crew)).unwrap();
        build_router(state)
    }

    async fn post_plan(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/plan")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let response = router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(r#"name="date_start""#));
    }

    #[tokio::test]
    async fn test_plan_success() {
        let (status, body) = post_plan(serde_json::json!({
            "origin": "San Mateo, CA",
            "destination": "Bali, Indonesia",
            "date_start": "2025-06-01",
            "date_end": "2025-06-10",
            "interests": "hiking"
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["markdown"], "# Trip to Bali, Indonesia\n\nDay 1: ...");
        assert!(body["html"].as_str().unwrap().contains("<h1>Trip to Bali, Indonesia</h1>"));
        assert!(body["progress"]
            .as_str()
            .unwrap()
            .contains("Amazing Travel Concierge"));
    }

    #[tokio::test]
    async fn test_plan_failure() {
        let (status, body) = post_plan(serde_json::json!({
            "origin": "San Mateo, CA",
            "destination": "Nowhere",
            "date_start": "2025-06-01",
            "date_end": "2025-06-10",
            "interests": ""
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("🚨 Oops! Something went wrong:"));
        assert!(message.contains("rate limited"));
    }

    #[tokio::test]
    async fn test_plan_rejects_reversed_dates() {
        let (status, body) = post_plan(serde_json::json!({
            "origin": "San Mateo, CA",
            "destination": "Bali, Indonesia",
            "date_start": "2025-06-10",
            "date_end": "2025-06-01"
        }))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["message"].as_str().unwrap().contains("after end date"));
    }
}
