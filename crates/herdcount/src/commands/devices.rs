//! Device command handlers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tabled::Tabled;

use herdcount_api::{ApiClient, Device, NewDevice};
use herdcount_config::Config;
use herdcount_core::DateTimeFormat;
use herdcount_core::derive::is_device_active_at;

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl DeviceRow {
    pub(crate) fn new(
        d: &Device,
        format: &DateTimeFormat,
        now: DateTime<Utc>,
        color: bool,
    ) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            location: if d.location.is_empty() {
                "-".into()
            } else {
                d.location.clone()
            },
            state: output::liveness_label(is_device_active_at(d.last_seen, now), color),
            last_seen: format!("{} ({})", format.format(&d.last_seen), ago(d.last_seen, now)),
        }
    }
}

/// Coarse "how long ago", e.g. `4m ago`.
fn ago(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let Ok(elapsed) = now.signed_duration_since(instant).to_std() else {
        return "just now".into();
    };
    // Seconds are noise once past a minute.
    let rounded = if elapsed >= Duration::from_secs(60) {
        Duration::from_secs(elapsed.as_secs() / 60 * 60)
    } else {
        Duration::from_secs(elapsed.as_secs())
    };
    format!("{} ago", humantime::format_duration(rounded))
}

fn detail(d: &Device, format: &DateTimeFormat) -> String {
    let now = Utc::now();
    [
        format!("ID:         {}", d.id),
        format!("Name:       {}", d.name),
        format!("Location:   {}", d.location),
        format!("Status:     {}", d.status.as_deref().unwrap_or("-")),
        format!(
            "Liveness:   {}",
            output::liveness_label(is_device_active_at(d.last_seen, now), false)
        ),
        format!(
            "Registered: {}",
            d.registered_at
                .as_ref()
                .map_or_else(|| "-".into(), |t| format.format(t))
        ),
        format!("Last seen:  {}", format.format(&d.last_seen)),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &ApiClient,
    args: DevicesArgs,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = cfg.datetime_format()?;

    match args.command {
        DevicesCommand::List => {
            let token = util::login(client, cfg, global).await?;
            let list = client.list_devices(&token).await?;
            let now = Utc::now();
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &list.devices,
                |d| DeviceRow::new(d, &format, now, color),
                |d| d.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Add { name, location } => {
            if name.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "device name cannot be empty".into(),
                });
            }
            let token = util::login(client, cfg, global).await?;
            let device = client
                .register_device(&token, &NewDevice { name, location })
                .await?;
            let out = output::render_single(
                &global.output,
                &device,
                |d| detail(d, &format),
                |d| d.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Remove { device } => {
            if !util::confirm(&format!("Remove device '{device}'?"), global.yes)? {
                return Ok(());
            }
            let token = util::login(client, cfg, global).await?;
            let message = client
                .remove_device(&token, &device)
                .await
                .map_err(|e| not_found_or(e, &device))?;
            if !global.quiet {
                eprintln!("{}", message.unwrap_or_else(|| "Device removed".into()));
            }
            Ok(())
        }

        DevicesCommand::Heartbeat { device } => {
            let message = client
                .heartbeat(&device)
                .await
                .map_err(|e| not_found_or(e, &device))?;
            if !global.quiet {
                eprintln!("{}", message.unwrap_or_else(|| "Heartbeat sent".into()));
            }
            Ok(())
        }
    }
}

fn not_found_or(err: herdcount_api::Error, device: &str) -> CliError {
    if err.is_not_found() {
        CliError::NotFound {
            resource_type: "device".into(),
            identifier: device.into(),
            list_command: "devices list".into(),
        }
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn ago_rounds_to_minutes() {
        let now = Utc::now();
        assert_eq!(ago(now - TimeDelta::seconds(42), now), "42s ago");
        assert_eq!(ago(now - TimeDelta::seconds(4 * 60 + 42), now), "4m ago");
        assert_eq!(ago(now + TimeDelta::seconds(5), now), "just now");
    }

    #[test]
    fn row_marks_stale_devices_inactive() {
        let now = Utc::now();
        let device = Device {
            id: "d1".into(),
            name: "Gate".into(),
            location: String::new(),
            status: None,
            registered_at: None,
            last_seen: now - TimeDelta::seconds(300),
        };
        let row = DeviceRow::new(&device, &DateTimeFormat::default(), now, false);
        assert_eq!(row.state, "Inactive");
        assert_eq!(row.location, "-");
    }
}
