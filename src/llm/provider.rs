//! Provider detection and endpoint layout.
//!
//! OpenAI-compatible hosts disagree on where `chat/completions` lives; this
//! module maps a base URL to the right endpoint.

/// Supported chat-completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// `DeepSeek` (api.deepseek.com)
    DeepSeek,
    /// `OpenAI` (api.openai.com)
    OpenAI,
    /// `OpenRouter` (openrouter.ai)
    OpenRouter,
    /// Groq (groq.com)
    Groq,
    /// Generic OpenAI-compatible provider
    Generic,
}

impl Provider {
    /// Detect provider from base URL.
    ///
    /// # Example
    ///
    /// ```rust
    /// use aibot::llm::Provider;
    ///
    /// let provider = Provider::detect_from_url("https://api.deepseek.com");
    /// assert_eq!(provider, Provider::DeepSeek);
    /// ```
    #[must_use]
    pub fn detect_from_url(base_url: &str) -> Self {
        let lower = base_url.to_lowercase();

        if lower.contains("deepseek.com") {
            Self::DeepSeek
        } else if lower.contains("openrouter.ai") {
            Self::OpenRouter
        } else if lower.contains("groq.com") {
            Self::Groq
        } else if lower.contains("openai.com") {
            Self::OpenAI
        } else {
            Self::Generic
        }
    }

    /// Build the chat completions URL for this provider.
    ///
    /// Base URLs that already carry a version segment (`/v1`, `/api/v1`,
    /// `/openai/v1`) are used as-is.
    #[must_use]
    pub fn build_chat_url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');

        if base.ends_with("/v1") {
            return format!("{base}/chat/completions");
        }

        match self {
            Self::DeepSeek => format!("{base}/chat/completions"),
            Self::OpenRouter => format!("{base}/api/v1/chat/completions"),
            Self::Groq => format!("{base}/openai/v1/chat/completions"),
            Self::OpenAI | Self::Generic => format!("{base}/v1/chat/completions"),
        }
    }
}
