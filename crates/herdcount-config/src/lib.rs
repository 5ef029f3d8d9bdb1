//! Configuration for the herdcount CLI.
//!
//! A flat TOML file at the platform config directory, layered under
//! `HERDCOUNT_*` environment variables, and translation to
//! [`herdcount_core::SessionConfig`]. Passwords are never part of it; the
//! token and password live only in process memory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use herdcount_core::config::DEFAULT_API_URL;
use herdcount_core::derive::DEFAULT_DATETIME_FORMAT;
use herdcount_core::{DateTimeFormat, SessionConfig, Timings, TlsVerification};

/// Environment variable prefix for every config key.
pub const ENV_PREFIX: &str = "HERDCOUNT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// API root of the counting service.
    pub api_url: String,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Accept invalid TLS certificates.
    pub insecure: bool,

    /// Path to a custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// `strftime` pattern for timestamps.
    pub datetime_format: String,

    /// Username pre-filled in the login prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            timeout: 30,
            insecure: false,
            ca_cert: None,
            datetime_format: DEFAULT_DATETIME_FORMAT.into(),
            username: None,
        }
    }
}

impl Config {
    /// Parse and validate the configured datetime pattern.
    pub fn datetime_format(&self) -> Result<DateTimeFormat, ConfigError> {
        DateTimeFormat::parse(&self.datetime_format).map_err(|e| ConfigError::Validation {
            field: "datetime_format".into(),
            reason: e.to_string(),
        })
    }

    /// Build the session settings. Timings always take their fixed defaults.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        let url: url::Url = self.api_url.parse().map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", self.api_url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "api_url".into(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        Ok(SessionConfig {
            url,
            tls,
            timeout: Duration::from_secs(self.timeout),
            timings: Timings::default(),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "herdcount", "herdcount").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("herdcount");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path` (if present), then environment.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).only(&[
            "api_url",
            "timeout",
            "insecure",
            "ca_cert",
            "datetime_format",
            "username",
        ]))
}

/// Load the config from `path` + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment_for(path).extract()?)
}

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}
