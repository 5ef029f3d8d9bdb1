// ── Core error types ──
//
// Errors surfaced by the session layer. Consumers never see reqwest
// errors or JSON parse failures directly: `From<herdcount_api::Error>`
// folds them into connectivity vs. service-rejection variants, which is
// the only distinction the UI draws.

use thiserror::Error;

use crate::session::View;

/// Message shown whenever the service could not be reached.
pub const CONNECTIVITY_MESSAGE: &str = "Could not connect to the server. Check that it is running.";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to counting service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Counting service timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Service rejections ───────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request rejected by service (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    // ── Session errors ───────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("A submission is already in progress")]
    Busy,

    #[error("Cannot {operation} from the {from} view")]
    InvalidTransition {
        from: View,
        operation: &'static str,
    },

    /// A logout happened while the request was in flight.
    #[error("The {operation} was cancelled by a logout")]
    Cancelled { operation: &'static str },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The service was never reached or never answered.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }

    /// Text for a user-facing notification.
    ///
    /// Service rejections pass the server's message through verbatim;
    /// every connectivity failure collapses into one generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout { .. } => CONNECTIVITY_MESSAGE.into(),
            Self::AuthenticationFailed { message }
            | Self::Rejected { message, .. }
            | Self::ValidationFailed { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<herdcount_api::Error> for CoreError {
    fn from(err: herdcount_api::Error) -> Self {
        match err {
            herdcount_api::Error::Api {
                status: 401,
                message,
            } => CoreError::AuthenticationFailed { message },
            herdcount_api::Error::Api { status, message } => {
                CoreError::Rejected { status, message }
            }
            // Timeouts already arrive as `Error::Timeout` with the configured value.
            herdcount_api::Error::Transport(ref e) => CoreError::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
            },
            herdcount_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            herdcount_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            herdcount_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            herdcount_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
