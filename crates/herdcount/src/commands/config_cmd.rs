//! Config subcommand handlers.

use dialoguer::{Confirm, Input};

use herdcount_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let path = config::config_path();
            eprintln!("herdcount configuration");
            eprintln!("   Config path: {}\n", path.display());

            if path.exists()
                && !Confirm::new()
                    .with_prompt("A config file already exists. Overwrite it?")
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?
            {
                return Ok(());
            }

            let defaults = Config::default();
            let api_url: String = Input::new()
                .with_prompt("Service API URL")
                .default(defaults.api_url.clone())
                .interact_text()
                .map_err(prompt_err)?;

            let username: String = Input::new()
                .with_prompt("Default username (blank to always ask)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let cfg = Config {
                api_url,
                username: Some(username).filter(|u| !u.trim().is_empty()),
                ..defaults
            };
            // Reject a bad URL before writing it out.
            cfg.to_session_config()?;

            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Saved {}", path.display());
            }
            Ok(())
        }

        // ── Show: resolved config ───────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::resolve(global)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| {
                    [
                        format!("api_url:         {}", c.api_url),
                        format!("timeout:         {}s", c.timeout),
                        format!("insecure:        {}", c.insecure),
                        format!(
                            "ca_cert:         {}",
                            c.ca_cert
                                .as_ref()
                                .map_or_else(|| "-".into(), |p| p.display().to_string())
                        ),
                        format!("datetime_format: {}", c.datetime_format),
                        format!("username:        {}", c.username.as_deref().unwrap_or("-")),
                    ]
                    .join("\n")
                },
                |c| c.api_url.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}
