//! Command dispatch: bridges CLI args -> API client / session -> output.

pub mod account;
pub mod config_cmd;
pub mod count;
pub mod counts;
pub mod devices;
pub mod ping;
pub mod stats;
pub mod util;
pub mod watch;

use herdcount_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    if let Command::Watch(args) = cmd {
        return watch::handle(args, cfg, global).await;
    }

    let client = config::build_client(cfg)?;
    match cmd {
        Command::Register => account::register(&client, cfg, global).await,
        Command::Whoami => account::whoami(&client, cfg, global).await,
        Command::Stats => stats::handle(&client, cfg, global).await,
        Command::Counts(args) => counts::handle(&client, args, cfg, global).await,
        Command::Devices(args) => devices::handle(&client, args, cfg, global).await,
        Command::Count(args) => count::handle(&client, args, cfg, global).await,
        Command::Ping => ping::handle(&client, global).await,
        // Handled before dispatch
        Command::Watch(_) | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
