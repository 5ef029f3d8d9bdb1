//! Stats command handler.

use herdcount_api::{ApiClient, CountStats};
use herdcount_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

pub(crate) fn detail(s: &CountStats) -> String {
    [
        format!("Total animals: {}", s.total_animals),
        format!("Today:         {}", s.today),
        format!("This week:     {}", s.this_week),
        format!("This month:    {}", s.this_month),
        format!("Records:       {}", s.total_records),
    ]
    .join("\n")
}

pub async fn handle(client: &ApiClient, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let token = util::login(client, cfg, global).await?;
    let stats = client.count_stats(&token).await?;

    let out = output::render_single(&global.output, &stats, detail, |s| {
        s.total_animals.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
