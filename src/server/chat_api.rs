//! Chat relay HTTP API.
//!
//! - POST /v1/chat/completions (streamed text relay)
//! - GET /health

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::relay::backend::{BackendStreamError, InvokeError, StreamingBackend};
use crate::relay::transduce::transduce;
use crate::relay::translate::{translate, ChatRequest};
use crate::server::streaming::relay_response;

/// Application state shared across handlers.
pub struct AppState {
    pub backend: Arc<dyn StreamingBackend>,
    pub config: Arc<Config>,
    pub start_time: Instant,
}

/// Build the axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─── Request/Response Types ────────────────────────────────────────────────

/// Error payload returned instead of a stream.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn chat_completions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();

    info!(
        request_id = request_id,
        model = req.model,
        messages = req.messages.len(),
        stream = req.stream,
        "Chat completion request"
    );

    // Reject before touching the backend; the error body matches what
    // clients of the original service expect.
    let payload = match translate(&req) {
        Ok(payload) => payload,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let events = match state.backend.invoke_streaming(&req.model, &payload).await {
        Ok(events) => events,
        Err(e) => {
            error!(request_id = request_id, error = %e, "Backend invocation failed");
            let status = match e {
                InvokeError::ModelNotFound(_) => StatusCode::NOT_FOUND,
                InvokeError::Throttled(_) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            };
            return (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    // Idle deadline per event: a stalled backend ends the stream instead
    // of holding the connection open indefinitely.
    let idle_secs = state.config.server.stream_timeout_secs;
    let events = events
        .timeout(Duration::from_secs(idle_secs))
        .map(move |item| match item {
            Ok(event) => event,
            Err(_) => Err(BackendStreamError::Idle(idle_secs)),
        });

    relay_response(transduce(events), request_id)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
