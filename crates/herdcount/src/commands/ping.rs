//! Liveness probe handler.

use herdcount_api::ApiClient;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &ApiClient, global: &GlobalOpts) -> Result<(), CliError> {
    let ping = client.ping().await?;
    let out = output::render_single(
        &global.output,
        &ping,
        |p| format!("{} ({})\nServer time: {}", p.message, client.base_url(), p.timestamp),
        |p| p.message.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
