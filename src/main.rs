//! aibot server
//!
//! Entry point: loads configuration, validates the provider credential and
//! serves the chat UI and relay endpoint.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use aibot::config::AppConfig;
use aibot::llm::{ChatCompletionsClient, RelaySettings};
use aibot::relay::Relay;
use aibot::server::start_server;

#[tokio::main]
async fn main() {
    // Load .env (if present)
    let _ = dotenv();

    init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Fatal error");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Initialize tracing (M-LOG-STRUCTURED). `LOG_FORMAT=json` selects JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Arc::new(AppConfig::load()?);

    // Missing credential is fatal before anything binds.
    let settings = RelaySettings::from_config(&config.llm)?;

    info!(
        name: "llm.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        provider = ?settings.provider,
        "LLM configuration loaded"
    );

    let client = ChatCompletionsClient::new(settings);
    let relay = Relay::new(Arc::new(client), config.llm.system_prompt.as_str());

    start_server(config, relay).await
}
