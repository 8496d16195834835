//! Chat-completion provider client.
//!
//! This module provides the abstraction the relay talks to: a
//! [`CompletionProvider`] turns an ordered message list into a stream of
//! assistant text fragments.
//!
//! # Providers
//!
//! - [`ChatCompletionsClient`]: OpenAI-compatible `chat/completions` over
//!   HTTP with server-sent events (DeepSeek by default).
//!
//! # Example
//!
//! ```rust,ignore
//! use aibot::llm::{ChatCompletionsClient, Message, RelaySettings};
//!
//! let settings = RelaySettings::from_config(&config.llm)?;
//! let client = ChatCompletionsClient::new(settings);
//! let stream = client.stream(vec![Message::user("Hello")]).await?;
//! ```

pub mod chat_completions;
pub mod provider;

pub use chat_completions::ChatCompletionsClient;
pub use provider::Provider;

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{RelayError, Result};

/// Stream of assistant text fragments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Validated provider connection and model settings.
#[derive(Clone)]
pub struct RelaySettings {
    /// Base URL for the provider API (e.g., `https://api.deepseek.com`).
    pub base_url: String,
    /// Credential sent as a bearer token.
    pub api_key: String,
    /// Model identifier (e.g., `deepseek-chat`).
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Provider type, detected from `base_url`.
    pub provider: Provider,
}

impl std::fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaySettings")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl RelaySettings {
    /// Validate the configured provider section.
    ///
    /// Fails with [`RelayError::MissingCredential`] when no non-blank
    /// credential is present.
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let api_key = cfg
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(RelayError::MissingCredential)?
            .to_string();

        let parsed = url::Url::parse(cfg.base_url.trim())
            .map_err(|e| RelayError::InvalidBaseUrl(format!("{}: {e}", cfg.base_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RelayError::InvalidBaseUrl(format!(
                "{}: unsupported scheme {}",
                cfg.base_url,
                parsed.scheme()
            )));
        }

        let base_url = cfg.base_url.trim().trim_end_matches('/').to_string();
        let provider = Provider::detect_from_url(&base_url);

        Ok(Self {
            base_url,
            api_key,
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            provider,
        })
    }

    /// Full chat-completions endpoint for these settings.
    #[must_use]
    pub fn chat_url(&self) -> String {
        self.provider.build_chat_url(&self.base_url)
    }
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,
    /// Text content of the message.
    pub content: String,
}

impl Message {
    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction.
    System,
    /// User message.
    User,
    /// Assistant response.
    Assistant,
}

/// JSON body of a streaming chat-completions request.
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
    pub temperature: f32,
}

/// Trait for streaming completion providers.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Stream the assistant reply to `messages` as text fragments.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the provider
    /// rejects it. Failures after the stream has started surface as
    /// `Err` items.
    async fn stream(&self, messages: Vec<Message>) -> Result<TextStream>;
}
