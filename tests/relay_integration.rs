use aibot::AppState;
use aibot::config::{AppConfig, LlmConfig, ResilienceConfig, ServerConfig};
use aibot::error::{RelayError, Result};
use aibot::llm::{
    ChatCompletionsClient, CompletionProvider, Message, MessageRole, RelaySettings, TextStream,
};
use aibot::relay::Relay;
use aibot::server::build_router;
use axum::{
    Json, Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    response::IntoResponse,
    routing::post,
};
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

const SYSTEM_PROMPT: &str = "You are aibot.";

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
            static_dir: "static".to_string(),
        },
        llm: LlmConfig {
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 0.7,
            system_prompt: SYSTEM_PROMPT.to_string(),
            api_key: Some("sk-test".to_string()),
        },
        resilience: ResilienceConfig {
            timeout_disabled: false,
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        },
    }
}

fn test_router(provider: Arc<dyn CompletionProvider>, resilience: ResilienceConfig) -> Router {
    let mut config = test_config();
    config.resilience = resilience;
    let config = Arc::new(config);
    let state = AppState {
        relay: Relay::new(provider, config.llm.system_prompt.as_str()),
        config,
    };
    build_router(state)
}

fn test_server(provider: Arc<dyn CompletionProvider>) -> TestServer {
    TestServer::new(test_router(provider, test_config().resilience)).unwrap()
}

/// One-second head timeout and a 64-byte request body limit.
fn tight_resilience() -> ResilienceConfig {
    ResilienceConfig {
        timeout_disabled: false,
        request_timeout_secs: 1,
        max_body_bytes: 64,
    }
}

/// Provider that records the messages it receives and replies with fixed fragments.
#[derive(Default)]
struct RecordingProvider {
    seen: Mutex<Option<Vec<Message>>>,
    reply: Vec<&'static str>,
    reject_with: Option<u16>,
}

#[async_trait::async_trait]
impl CompletionProvider for RecordingProvider {
    async fn stream(&self, messages: Vec<Message>) -> Result<TextStream> {
        *self.seen.lock().unwrap() = Some(messages);
        if let Some(status) = self.reject_with {
            return Err(RelayError::Upstream {
                status,
                body: "rejected".to_string(),
            });
        }
        let items: Vec<Result<String>> = self.reply.iter().map(|s| Ok((*s).to_string())).collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

#[tokio::test]
async fn test_relay_prepends_system_message_and_streams_text() {
    let provider = Arc::new(RecordingProvider {
        reply: vec!["Hello", ", ", "world!"],
        ..Default::default()
    });
    let server = test_server(provider.clone());

    let response = server
        .post("/api/chat")
        .json(&json!({
            "messages": [
                { "role": "user", "content": "Hi" },
                { "role": "assistant", "content": "Hello! How can I help?" },
                { "role": "user", "content": "Say hello to the world" }
            ]
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "Hello, world!");
    let content_type = response.header("content-type");
    assert!(content_type.to_str().unwrap().starts_with("text/plain"));

    let seen = provider.seen.lock().unwrap().clone().unwrap();
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[0], Message::system(SYSTEM_PROMPT));
    assert_eq!(seen[1], Message::user("Hi"));
    assert_eq!(seen[2].role, MessageRole::Assistant);
    assert_eq!(seen[3].content, "Say hello to the world");
}

#[tokio::test]
async fn test_unknown_role_rejected() {
    let provider = Arc::new(RecordingProvider::default());
    let server = test_server(provider.clone());

    let response = server
        .post("/api/chat")
        .json(&json!({ "messages": [{ "role": "tool", "content": "x" }] }))
        .await;

    assert!(response.status_code().is_client_error());
    assert!(provider.seen.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_missing_messages_rejected() {
    let server = test_server(Arc::new(RecordingProvider::default()));

    let response = server.post("/api/chat").json(&json!({ "text": "hi" })).await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_provider_rejection_is_bad_gateway() {
    let provider = Arc::new(RecordingProvider {
        reject_with: Some(401),
        ..Default::default()
    });
    let server = test_server(provider);

    let response = server
        .post("/api/chat")
        .json(&json!({ "messages": [{ "role": "user", "content": "Hi" }] }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert!(response.text().contains("401"));
}

/// Provider that waits before answering, then streams its fragments with a pause between each.
struct SlowProvider {
    head_delay: Duration,
    gap: Duration,
    reply: Vec<&'static str>,
}

#[async_trait::async_trait]
impl CompletionProvider for SlowProvider {
    async fn stream(&self, _messages: Vec<Message>) -> Result<TextStream> {
        tokio::time::sleep(self.head_delay).await;
        let gap = self.gap;
        let reply = self.reply.clone();
        let out = async_stream::stream! {
            for (i, text) in reply.into_iter().enumerate() {
                if i > 0 {
                    tokio::time::sleep(gap).await;
                }
                yield Ok(text.to_string());
            }
        };
        Ok(Box::pin(out))
    }
}

/// Provider that sends one fragment and then fails.
struct BrokenStreamProvider;

#[async_trait::async_trait]
impl CompletionProvider for BrokenStreamProvider {
    async fn stream(&self, _messages: Vec<Message>) -> Result<TextStream> {
        let items: Vec<Result<String>> = vec![
            Ok("partial".to_string()),
            Err(RelayError::Stream("connection reset".to_string())),
            Ok("never sent".to_string()),
        ];
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

fn chat_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_slow_response_head_times_out() {
    let provider = Arc::new(SlowProvider {
        head_delay: Duration::from_secs(3),
        gap: Duration::ZERO,
        reply: vec!["late"],
    });
    let server = TestServer::new(test_router(provider, tight_resilience())).unwrap();

    let response = server
        .post("/api/chat")
        .json(&json!({ "messages": [{ "role": "user", "content": "Hi" }] }))
        .await;

    response.assert_status(StatusCode::REQUEST_TIMEOUT);
    assert_eq!(response.text(), "Request timed out");
}

#[tokio::test]
async fn test_slow_streamed_body_is_not_cut() {
    let provider = Arc::new(SlowProvider {
        head_delay: Duration::ZERO,
        gap: Duration::from_millis(1500),
        reply: vec!["a", "b"],
    });
    let server = TestServer::new(test_router(provider, tight_resilience())).unwrap();

    let response = server
        .post("/api/chat")
        .json(&json!({ "messages": [{ "role": "user", "content": "Hi" }] }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "ab");
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let provider = Arc::new(RecordingProvider::default());
    let app = test_router(provider.clone(), tight_resilience());

    let body = json!({ "messages": [{ "role": "user", "content": "x".repeat(200) }] });
    let response = app.oneshot(chat_request(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(provider.seen.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_mid_stream_error_aborts_body() {
    let app = test_router(Arc::new(BrokenStreamProvider), test_config().resilience);

    let body = json!({ "messages": [{ "role": "user", "content": "Hi" }] });
    let response = app.oneshot(chat_request(body.to_string())).await.unwrap();

    // Headers were already committed, so the failure shows up as a broken body.
    assert_eq!(response.status(), StatusCode::OK);
    let collected = axum::body::to_bytes(response.into_body(), usize::MAX).await;
    assert!(collected.is_err());
}

#[tokio::test]
async fn test_pages_served() {
    let server = test_server(Arc::new(RecordingProvider::default()));

    let landing = server.get("/").await;
    landing.assert_status_ok();
    assert!(landing.text().contains(r#"href="/chat""#));

    let chat = server.get("/chat").await;
    chat.assert_status_ok();
    assert!(chat.text().contains("/static/chat.js"));

    let health = server.get("/healthz").await;
    health.assert_status_ok();
    assert_eq!(health.text(), "ok");

    let script = server.get("/static/chat.js").await;
    script.assert_status_ok();
}

// ─────────────────────────────────────────────────────────────────────────────
// Real client against an in-process upstream
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Captured {
    body: Arc<Mutex<Option<Value>>>,
    auth: Arc<Mutex<Option<String>>>,
}

const UPSTREAM_SSE: &str = concat!(
    "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
    ": keep-alive\n\n",
    "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Bonjour\"}}]}\n\n",
    "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\" le monde\"}}]}\n\n",
    "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    "data: [DONE]\n\n",
);

async fn spawn_upstream(status: StatusCode) -> (String, Captured) {
    let captured = Captured::default();
    let state = captured.clone();

    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let state = state.clone();
            async move {
                *state.body.lock().unwrap() = Some(body);
                *state.auth.lock().unwrap() = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(ToString::to_string);
                if status.is_success() {
                    (
                        status,
                        [("content-type", "text/event-stream")],
                        UPSTREAM_SSE,
                    )
                        .into_response()
                } else {
                    (status, r#"{"error":{"message":"Authentication Fails"}}"#).into_response()
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), captured)
}

fn client_for(base_url: &str) -> Arc<dyn CompletionProvider> {
    let mut llm = test_config().llm;
    llm.base_url = base_url.to_string();
    let settings = RelaySettings::from_config(&llm).unwrap();
    Arc::new(ChatCompletionsClient::new(settings))
}

#[tokio::test]
async fn test_real_client_round_trip() {
    let (base_url, captured) = spawn_upstream(StatusCode::OK).await;
    let server = test_server(client_for(&base_url));

    let response = server
        .post("/api/chat")
        .json(&json!({ "messages": [{ "role": "user", "content": "Say hello in French" }] }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "Bonjour le monde");

    let body = captured.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "deepseek-chat");
    assert_eq!(body["stream"], true);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "Say hello in French");
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);

    let auth = captured.auth.lock().unwrap().clone();
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
}

#[tokio::test]
async fn test_real_client_upstream_error() {
    let (base_url, _captured) = spawn_upstream(StatusCode::UNAUTHORIZED).await;
    let server = test_server(client_for(&base_url));

    let response = server
        .post("/api/chat")
        .json(&json!({ "messages": [{ "role": "user", "content": "Hi" }] }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert!(response.text().contains("Authentication Fails"));
}
