//! aibot
//!
//! A browser chat client backed by a streaming relay to a hosted
//! chat-completion API.
//!
//! # Architecture
//!
//! - **Server**: Axum-based HTTP server serving the pages, static assets and
//!   the relay endpoint
//! - **Relay**: prepends the fixed system instruction and forwards the
//!   conversation to the provider, streaming text fragments back
//! - **UI**: server-rendered HTML shells; threads live in browser memory
//!
//! # Modules
//!
//! - [`config`]: Layered configuration (defaults, file, env, CLI)
//! - [`error`]: Relay error type
//! - [`llm`]: Provider client and message types
//! - [`relay`]: Conversation relay
//! - [`sse`]: Server-sent event decoding
//! - [`server`]: Router and handlers
//! - [`ui`]: HTML pages

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod error;
pub mod llm;
pub mod relay;
pub mod server;
pub mod sse;
pub mod ui;

use crate::config::AppConfig;
use relay::Relay;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Relay to the completion provider.
    pub relay: Relay,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
