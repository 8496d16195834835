//! Conversation relay.
//!
//! The relay owns the fixed system instruction and the provider. For every
//! request it prepends the instruction to the client's messages and hands
//! back the provider's fragment stream, logging how much was forwarded.

use std::sync::Arc;

use futures::StreamExt;

use crate::error::Result;
use crate::llm::{CompletionProvider, Message, TextStream};

/// Forwards conversations to a completion provider.
#[derive(Clone)]
pub struct Relay {
    provider: Arc<dyn CompletionProvider>,
    system_prompt: Arc<str>,
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("system_prompt_len", &self.system_prompt.len())
            .finish_non_exhaustive()
    }
}

impl Relay {
    /// Create a relay over `provider` with a fixed system instruction.
    pub fn new(provider: Arc<dyn CompletionProvider>, system_prompt: impl Into<Arc<str>>) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
        }
    }

    /// Build the provider message list: the system instruction, then the
    /// client's messages in their original order.
    #[must_use]
    pub fn prepare(&self, messages: Vec<Message>) -> Vec<Message> {
        let mut out = Vec::with_capacity(messages.len() + 1);
        out.push(Message::system(self.system_prompt.as_ref()));
        out.extend(messages);
        out
    }

    /// Start a relay and return the assistant's fragment stream.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the upstream call cannot be started.
    pub async fn relay(&self, messages: Vec<Message>) -> Result<TextStream> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let messages = self.prepare(messages);

        tracing::info!(
            name: "relay.started",
            request_id = %request_id,
            message_count = messages.len(),
            "Relaying conversation"
        );
        for (idx, msg) in messages.iter().enumerate() {
            tracing::trace!(
                request_id = %request_id,
                message_index = idx,
                role = ?msg.role,
                content = %msg.content,
                "Message in history"
            );
        }

        let upstream = match self.provider.stream(messages).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(
                    name: "relay.failed",
                    request_id = %request_id,
                    error = %e,
                    "Failed to start provider stream"
                );
                return Err(e);
            }
        };

        let out = async_stream::stream! {
            let mut fragments = 0usize;
            let mut bytes = 0usize;

            futures::pin_mut!(upstream);
            while let Some(item) = upstream.next().await {
                match &item {
                    Ok(text) => {
                        fragments += 1;
                        bytes += text.len();
                    }
                    Err(e) => {
                        tracing::error!(
                            name: "relay.failed",
                            request_id = %request_id,
                            error = %e,
                            fragments,
                            "Provider stream failed"
                        );
                    }
                }
                let failed = item.is_err();
                yield item;
                if failed {
                    return;
                }
            }

            tracing::info!(
                name: "relay.completed",
                request_id = %request_id,
                fragments,
                bytes,
                "Relay complete"
            );
        };

        Ok(Box::pin(out))
    }
}
