//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use herdcount_config::ConfigError;
use herdcount_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the counting service at {url}")]
    #[diagnostic(
        code(herdcount::connection_failed),
        help(
            "Check that the service is running and reachable.\n\
             Set the address with --api-url or `api_url` in the config file."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(herdcount::timeout),
        help("Increase timeout with --timeout or check service responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(herdcount::auth_failed),
        help(
            "Check your username and password.\n\
             No account yet? Run: herdcount register"
        )
    )]
    AuthFailed { message: String },

    // ── Service ──────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(herdcount::not_found),
        help("Run: herdcount {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Rejected by service (HTTP {status}): {message}")]
    #[diagnostic(code(herdcount::rejected))]
    Rejected { status: u16, message: String },

    #[error("Unexpected response from service: {message}")]
    #[diagnostic(code(herdcount::internal))]
    Internal { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(herdcount::validation))]
    Validation { field: String, reason: String },

    #[error("{what} needs an interactive terminal")]
    #[diagnostic(
        code(herdcount::non_interactive),
        help("Pass --username and --password (or HERDCOUNT_PASSWORD) when scripting.")
    )]
    NonInteractive { what: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(herdcount::config),
        help("Inspect it with: herdcount config show")
    )]
    Config(#[from] ConfigError),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::NonInteractive { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            Self::Internal { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Rejected { status, message } => CliError::Rejected { status, message },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            err @ (CoreError::Busy
            | CoreError::InvalidTransition { .. }
            | CoreError::Cancelled { .. }) => {
                CliError::Internal {
                    message: err.to_string(),
                }
            }
            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

impl From<herdcount_api::Error> for CliError {
    fn from(err: herdcount_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_rejections_keep_their_message() {
        let err = CliError::from(herdcount_api::Error::Api {
            status: 400,
            message: "username exists".into(),
        });
        assert_eq!(err.exit_code(), exit_code::REJECTED);
        assert!(err.to_string().contains("username exists"));
    }

    #[test]
    fn unauthorized_is_an_auth_failure() {
        let err = CliError::from(herdcount_api::Error::Api {
            status: 401,
            message: "Token inválido".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn timeouts_have_their_own_exit_code() {
        let err = CliError::from(herdcount_api::Error::Timeout { timeout_secs: 30 });
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
    }
}
