/*
[INPUT]:  Error sources (HTTP, API, serialization, auth handshake, WebSocket)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Message surfaced when a REST response body cannot be decoded as JSON
pub const UNEXPECTED_DATA_MESSAGE: &str = "An unexpected data error occurred.\nPlease try again later. If the issue persists, please contact support at  (tech.support@fugle.tw)";

const RESPONSE_PREVIEW_LEN: usize = 200;

/// Failure captured by the authentication handshake.
///
/// Stored on the WebSocket session until the next disconnect, so it must be
/// cheap to clone and compare.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was configured for the handshake
    #[error("Authentication failed: no credentials were provided")]
    MissingCredentials,

    /// Server rejected the credentials
    #[error("Authentication failed: {message}")]
    Rejected { message: String },

    /// Server did not answer the auth frame in time
    #[error("Authentication timed out after {}ms", .duration.as_millis())]
    Timeout { duration: Duration },
}

/// Main error type for the Fugle market data client
#[derive(Error, Debug)]
pub enum FugleError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status or an undecodable body
    #[error("{}", format_api_error(.message, .url, .status, .params, .body))]
    Api {
        message: String,
        url: String,
        status: Option<u16>,
        params: Option<String>,
        body: Option<String>,
    },

    /// Invalid client options
    #[error("Configuration error: {0}")]
    Config(String),

    /// WebSocket handshake failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Transport did not open in time
    #[error("Connection timeout after {}ms", .duration.as_millis())]
    ConnectTimeout { duration: Duration },

    /// Outbound frame requested while no transport is open
    #[error("WebSocket not connected")]
    NotConnected,

    /// `connect` called on a client that already owns a transport
    #[error("WebSocket already connected")]
    AlreadyConnected,

    /// Heartbeat supervisor gave up on the connection
    #[error("Health check failed: {0}")]
    HealthCheck(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl FugleError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FugleError::Http(_)
                | FugleError::WebSocket(_)
                | FugleError::ConnectTimeout { .. }
                | FugleError::HealthCheck(_)
                | FugleError::Auth(AuthError::Timeout { .. })
        )
    }

    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(self, FugleError::Auth(_))
    }

    /// Build the error returned for a non-JSON REST body
    pub fn unexpected_data(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        FugleError::Api {
            message: UNEXPECTED_DATA_MESSAGE.to_string(),
            url: url.into(),
            status: Some(status),
            params: None,
            body: Some(body.into()),
        }
    }
}

fn format_api_error(
    message: &str,
    url: &str,
    status: &Option<u16>,
    params: &Option<String>,
    body: &Option<String>,
) -> String {
    let mut parts = vec![format!("[Fugle API Error] {message}")];
    if !url.is_empty() {
        parts.push(format!("URL: {url}"));
    }
    if let Some(status) = status {
        parts.push(format!("Status: {status}"));
    }
    if let Some(params) = params.as_deref().filter(|p| !p.is_empty()) {
        parts.push(format!("Params: {params}"));
    }
    if let Some(body) = body.as_deref().filter(|b| !b.is_empty()) {
        let preview: String = body.chars().take(RESPONSE_PREVIEW_LEN).collect();
        parts.push(format!("Response: {preview}..."));
    }
    parts.join("\n")
}

/// Result type alias for Fugle operations
pub type Result<T> = std::result::Result<T, FugleError>;
