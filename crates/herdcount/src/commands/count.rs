//! Count submission handler.

use herdcount_api::{ApiClient, NewCount};
use herdcount_config::Config;

use crate::cli::{CountArgs, CountCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: &ApiClient,
    args: CountArgs,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CountCommand::Add {
            device,
            count,
            animal_type,
        } => {
            if count == 0 {
                return Err(CliError::Validation {
                    field: "count".into(),
                    reason: "must be at least 1".into(),
                });
            }
            let format = cfg.datetime_format()?;
            // Sensors post unauthenticated.
            let record = client
                .record_count(&NewCount {
                    device_id: device,
                    count,
                    animal_type,
                })
                .await?;

            let out = output::render_single(
                &global.output,
                &record,
                |r| {
                    format!(
                        "Recorded {} x {} from {} at {}",
                        r.count,
                        r.animal_type,
                        r.device_id,
                        format.format(&r.timestamp)
                    )
                },
                |r| r.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
