//! Error types for the relay.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while configuring or running the relay.
#[derive(Error, Debug)]
pub enum RelayError {
    /// No provider credential was configured.
    #[error("DEEPSEEK_API_KEY is not defined in environment variables")]
    MissingCredential,

    /// The provider base URL is not an absolute http(s) URL.
    #[error("Invalid provider base URL: {0}")]
    InvalidBaseUrl(String),

    /// HTTP transport failure talking to the provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("Provider error ({status}): {body}")]
    Upstream {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// A stream chunk could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider reported an error inside the event stream.
    #[error("Stream error: {0}")]
    Stream(String),
}

impl RelayError {
    /// HTTP status used when this error reaches a client.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredential | Self::InvalidBaseUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Http(_) | Self::Upstream { .. } | Self::Json(_) | Self::Stream(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
