use axum::{
    Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::error::RelayError;
use crate::llm::Message;
use crate::relay::Relay;
use crate::ui;

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>, relay: Relay) -> anyhow::Result<()> {
    let state = AppState {
        relay,
        config: Arc::clone(&config),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    // A year stands in for "no timeout" so the layer stack keeps one type.
    let timeout_duration = if config.resilience.timeout_disabled {
        Duration::from_secs(365 * 24 * 60 * 60)
    } else {
        Duration::from_secs(config.resilience.request_timeout_secs)
    };

    Router::new()
        .route("/", get(landing_handler))
        .route("/chat", get(chat_handler))
        .route("/api/chat", post(api_chat))
        .route("/healthz", get(healthz))
        .nest_service("/static", ServeDir::new(&config.server.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.resilience.max_body_bytes))
        // Bounds the time to the response head; streamed bodies are not cut.
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout_duration, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Landing page.
async fn landing_handler() -> Html<String> {
    Html(ui::landing::render())
}

/// GET /chat - Chat page.
async fn chat_handler() -> Html<String> {
    Html(ui::chat::render())
}

/// GET /healthz - Liveness check.
async fn healthz() -> &'static str {
    "ok"
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for the relay endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far, oldest first.
    pub messages: Vec<Message>,
}

/// POST /api/chat - Relay the conversation and stream the reply as text.
async fn api_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, RelayError> {
    tracing::info!(
        message_count = req.messages.len(),
        "Received chat request"
    );

    let stream = state.relay.relay(req.messages).await?;

    // An Err item aborts the body, which is how mid-stream failures reach the client.
    let body = Body::from_stream(stream.map(|item| item.map(axum::body::Bytes::from)));
    Ok(build_text_stream_response(body))
}

fn build_text_stream_response(body: Body) -> Response {
    let mut resp = Response::new(body);
    let h = resp.headers_mut();
    h.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    h.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-cache"),
    );
    h.insert("X-Accel-Buffering", header::HeaderValue::from_static("no"));
    resp
}
