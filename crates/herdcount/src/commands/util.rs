//! Shared helpers for command handlers.

use std::io::IsTerminal;

use dialoguer::{Confirm, Input, Password};
use secrecy::SecretString;
use tracing::debug;

use herdcount_api::{ApiClient, Credentials};
use herdcount_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn require_terminal(what: &str) -> Result<(), CliError> {
    if std::io::stdin().is_terminal() {
        Ok(())
    } else {
        Err(CliError::NonInteractive { what: what.into() })
    }
}

/// Username from `--username` / config, otherwise prompted.
pub fn resolve_username(cfg: &Config) -> Result<String, CliError> {
    if let Some(ref username) = cfg.username {
        return Ok(username.clone());
    }
    prompt_username(None)
}

pub fn prompt_username(default: Option<&str>) -> Result<String, CliError> {
    require_terminal("Username prompt")?;
    let mut input = Input::<String>::new().with_prompt("Username");
    if let Some(default) = default {
        input = input.default(default.to_owned());
    }
    input.interact_text().map_err(prompt_err)
}

pub fn prompt_password(confirm: bool) -> Result<String, CliError> {
    require_terminal("Password prompt")?;
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }
    prompt.interact().map_err(prompt_err)
}

/// Credentials from flags/env/config, prompting for what is missing.
pub fn resolve_credentials(
    cfg: &Config,
    global: &GlobalOpts,
    confirm_password: bool,
) -> Result<Credentials, CliError> {
    let username = resolve_username(cfg)?;
    let password = match global.password {
        Some(ref password) => password.clone(),
        None => prompt_password(confirm_password)?,
    };
    Ok(Credentials::new(username, password))
}

/// Log in for a one-shot command. No loading delay: that belongs to `watch`.
pub async fn login(
    client: &ApiClient,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    let credentials = resolve_credentials(cfg, global, false)?;
    if !credentials.is_complete() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "username and password are required".into(),
        });
    }
    let grant = client.login(&credentials).await?;
    debug!(username = grant.username.as_deref().unwrap_or(&credentials.username), "authenticated");
    Ok(grant.token)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    require_terminal("Confirmation")?;
    Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}
