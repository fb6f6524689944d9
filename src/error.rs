// ABOUTME: Error taxonomy for apoteker — configuration, validation, and upstream failures.
// ABOUTME: Only configuration errors are fatal; the other two keep the session usable.

use std::time::Duration;

use thiserror::Error;

/// Fatal startup problems. Raised before any session or terminal UI exists.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{var} not found. Set it in the environment, a .env file, or {secrets}")]
    MissingCredential { var: String, secrets: String },

    #[error("unknown provider '{0}'. Expected: gemini, responses")]
    UnknownProvider(String),

    #[error("provider '{0}' does not retain conversation state; use context = \"resend\"")]
    StatefulUnsupported(String),

    #[error("failed to read config file {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Rejected user input. Never reaches the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message text is empty")]
    EmptyMessage,
}

/// Any failure of a single call to the generation service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("no reply within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("service error: {0}")]
    Service(String),

    #[error("service returned an empty reply")]
    EmptyReply,
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Malformed(err.to_string())
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

/// Outcome of a failed `ConversationRelay::send`.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
