//! CLI-side configuration: file + env via `herdcount-config`, then flags.

use herdcount_api::ApiClient;
use herdcount_config::Config;
use herdcount_core::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use herdcount_config::{config_path, load_config, save_config};

/// Load the config file and apply `--api-url`, `--timeout`, `--insecure`.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config()?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref url) = global.api_url {
        cfg.api_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    if global.insecure {
        cfg.insecure = true;
    }
    if let Some(ref username) = global.username {
        cfg.username = Some(username.clone());
    }
}

pub fn session_config(cfg: &Config) -> Result<SessionConfig, CliError> {
    Ok(cfg.to_session_config()?)
}

/// HTTP client for one-shot commands.
pub fn build_client(cfg: &Config) -> Result<ApiClient, CliError> {
    Ok(session_config(cfg)?.build_client()?)
}
