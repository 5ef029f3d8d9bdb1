// ── Runtime session configuration ──
//
// Describes *how* to reach the counting service and the fixed timings of
// the session. Carries no credentials and never touches disk; the CLI
// builds a `SessionConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use herdcount_api::{ApiClient, TlsMode, TransportConfig};
use url::Url;

use crate::error::CoreError;

/// Where the service lives unless configured otherwise.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Pause between a successful login and the dashboard view.
pub const LOADING_DELAY: Duration = Duration::from_secs(4);

/// Dashboard refresh cadence.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Lifetime of a transient notification.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed deployments).
    DangerAcceptInvalid,
}

/// Timers that shape the session. Fixed in production; tests may shrink them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub loading_delay: Duration,
    pub poll_interval: Duration,
    pub notification_ttl: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            loading_delay: LOADING_DELAY,
            poll_interval: POLL_INTERVAL,
            notification_ttl: NOTIFICATION_TTL,
        }
    }
}

/// Connection settings for one counting service.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// API root, e.g. `http://localhost:5000/api`.
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    pub timings: Timings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            timings: Timings::default(),
        }
    }
}

impl SessionConfig {
    /// Transport settings for the HTTP client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }

    /// Build the HTTP client for this configuration.
    pub fn build_client(&self) -> Result<ApiClient, CoreError> {
        Ok(ApiClient::new(self.url.as_str(), &self.transport())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let config = SessionConfig::default();
        assert_eq!(config.url.as_str(), "http://localhost:5000/api");
        assert_eq!(config.timings.loading_delay, Duration::from_millis(4000));
        assert_eq!(config.timings.poll_interval, Duration::from_millis(5000));
        assert_eq!(config.timings.notification_ttl, Duration::from_millis(3000));
    }

    #[test]
    fn default_config_builds_a_client() {
        let client = SessionConfig::default()
            .build_client()
            .expect("client builds");
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/api/");
    }
}
