//! Count record command handlers.

use tabled::Tabled;

use herdcount_api::{ApiClient, CountRecord};
use herdcount_config::Config;
use herdcount_core::{DateTimeFormat, recent_records};

use crate::cli::{CountsArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct RecordRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Animal")]
    animal: String,
    #[tabled(rename = "Count")]
    count: u32,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl RecordRow {
    pub(crate) fn new(r: &CountRecord, format: &DateTimeFormat) -> Self {
        Self {
            time: format.format(&r.timestamp),
            animal: r.animal_type.clone(),
            count: r.count,
            device: r.device_id.clone(),
            id: r.id.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &ApiClient,
    args: CountsArgs,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = cfg.datetime_format()?;
    let token = util::login(client, cfg, global).await?;

    let (records, summary) = if args.all {
        let list = client.list_counts(&token).await?;
        let summary = format!("{} records", list.total);
        (list.counts, summary)
    } else {
        let today = client.today_counts(&token).await?;
        let summary = format!(
            "{} animals today across {} records",
            today.total_today, today.records
        );
        (today.counts, summary)
    };
    let records = if args.recent {
        recent_records(records)
    } else {
        records
    };

    let out = output::render_list(
        &global.output,
        &records,
        |r| RecordRow::new(r, &format),
        |r| r.id.clone(),
    );
    output::print_output(&out, global.quiet);
    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        eprintln!("{summary}");
    }
    Ok(())
}
