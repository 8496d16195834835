//! OpenAI-compatible Chat Completions client.
//!
//! This module implements the [`CompletionProvider`] trait for the
//! `chat/completions` endpoint with `stream: true`, forwarding each
//! `delta.content` fragment as it arrives.

use futures::StreamExt;

use crate::error::{RelayError, Result};
use crate::sse::{ChunkEvent, SseDecoder, parse_chunk};

use super::{CompletionProvider, CompletionRequest, Message, RelaySettings, TextStream};

/// Client for an OpenAI-compatible Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    settings: RelaySettings,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatCompletionsClient {
    /// Create a new client with the given settings.
    #[must_use]
    pub fn new(settings: RelaySettings) -> Self {
        Self::with_http_client(reqwest::Client::new(), settings)
    }

    /// Create a client that reuses an existing connection pool.
    #[must_use]
    pub fn with_http_client(http: reqwest::Client, settings: RelaySettings) -> Self {
        Self { http, settings }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for ChatCompletionsClient {
    async fn stream(&self, messages: Vec<Message>) -> Result<TextStream> {
        let url = self.settings.chat_url();
        let body = CompletionRequest {
            model: &self.settings.model,
            messages: &messages,
            stream: true,
            temperature: self.settings.temperature,
        };

        tracing::debug!(
            url = %url,
            model = %self.settings.model,
            message_count = messages.len(),
            "Sending chat completion request"
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let byte_stream = resp.bytes_stream();

        let out = async_stream::try_stream! {
            let mut decoder = SseDecoder::new();

            futures::pin_mut!(byte_stream);
            'outer: while let Some(chunk) = byte_stream.next().await {
                let chunk = chunk?;
                for data in decoder.push(&chunk) {
                    match parse_chunk(&data)? {
                        ChunkEvent::Delta(text) => yield text,
                        ChunkEvent::Done => break 'outer,
                        ChunkEvent::Empty => {}
                    }
                }
            }

            // Some servers close without a trailing blank line.
            if let Some(data) = decoder.finish() {
                if let ChunkEvent::Delta(text) = parse_chunk(&data)? {
                    yield text;
                }
            }
        };

        Ok(Box::pin(out))
    }
}
