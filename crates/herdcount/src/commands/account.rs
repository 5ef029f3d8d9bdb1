//! Account command handlers: register, whoami.

use herdcount_api::ApiClient;
use herdcount_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn register(client: &ApiClient, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let credentials = util::resolve_credentials(cfg, global, true)?;
    if !credentials.is_complete() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "username and password are required".into(),
        });
    }

    let message = client.register(&credentials).await?;
    if !global.quiet {
        eprintln!(
            "{}",
            message.unwrap_or_else(|| format!("Account '{}' created", credentials.username))
        );
    }
    Ok(())
}

pub async fn whoami(client: &ApiClient, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let token = util::login(client, cfg, global).await?;
    let verification = client.verify(&token).await?;

    let out = output::render_single(
        &global.output,
        &verification,
        |v| format!("Username: {}\nToken:    {}", v.username, v.message),
        |v| v.username.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
