//! Interactive session: login/register forms, loading pause, live dashboard.
//!
//! The state machine lives in `herdcount_core::Session`; this module only
//! prompts, waits on its watch channels and redraws.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use chrono::Utc;
use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::debug;

use herdcount_api::{ApiClient, CountRecord, CountStats, Device};
use herdcount_config::Config;
use herdcount_core::{DashboardSnapshot, DateTimeFormat, Session, View};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::counts::RecordRow;
use super::devices::DeviceRow;
use super::{stats, util};

/// Liveness depends on the clock, not just on refreshes.
const LIVENESS_REDRAW: Duration = Duration::from_secs(15);

enum FormAction {
    Submit,
    Toggle,
    Quit,
}

pub async fn handle(args: WatchArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::connect(&cfg.to_session_config()?)?;
    let format = cfg.datetime_format()?;
    let color = output::should_color(&global.color);

    if args.register {
        session.show_register()?;
    }

    if !authenticate(&session, cfg, global, color).await? {
        return Ok(());
    }
    if !wait_for_dashboard(&session).await? {
        finish(&session, color);
        return Ok(());
    }

    run_dashboard(&session, &format, color, global).await;
    finish(&session, color);
    Ok(())
}

// ── Forms ───────────────────────────────────────────────────────────

/// Drive the forms until a login succeeds (`true`) or the user quits.
async fn authenticate(
    session: &Session<ApiClient>,
    cfg: &Config,
    global: &GlobalOpts,
    color: bool,
) -> Result<bool, CliError> {
    let interactive = io::stdin().is_terminal();
    // Flag/env credentials get exactly one attempt, on the login form.
    let mut scripted = global
        .password
        .clone()
        .filter(|_| session.view() == View::Login);

    loop {
        let view = session.view();
        if view == View::Loading {
            return Ok(true);
        }

        let (username, password) = if let Some(password) = scripted.take() {
            (util::resolve_username(cfg)?, password)
        } else {
            match choose_action(view)? {
                FormAction::Submit => {}
                FormAction::Toggle => {
                    session.toggle_form()?;
                    continue;
                }
                FormAction::Quit => return Ok(false),
            }
            let username = util::prompt_username(cfg.username.as_deref())?;
            let password = util::prompt_password(view == View::Register)?;
            (username, password)
        };

        session.set_username(username);
        session.set_password(password);
        let result = session.submit().await;
        if let Some(notification) = session.notification() {
            eprintln!("{}", output::notification_line(&notification, color));
        }

        if let Err(e) = result {
            debug!(error = %e, %view, "submission failed");
            if !interactive {
                return Err(e.into());
            }
        }
    }
}

fn choose_action(view: View) -> Result<FormAction, CliError> {
    let items: &[&str] = match view {
        View::Register => &["Create account", "Back to login", "Quit"],
        _ => &["Log in", "Create an account", "Quit"],
    };
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractive {
            what: "The login form".into(),
        });
    }
    let picked = Select::new()
        .items(items)
        .default(0)
        .interact()
        .map_err(util::prompt_err)?;
    Ok(match picked {
        0 => FormAction::Submit,
        1 => FormAction::Toggle,
        _ => FormAction::Quit,
    })
}

// ── Loading ─────────────────────────────────────────────────────────

/// Spinner until the session leaves Loading. `false` if interrupted.
async fn wait_for_dashboard(session: &Session<ApiClient>) -> Result<bool, CliError> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!(
        "Welcome, {}! Loading dashboard...",
        session.username()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut state = session.subscribe();
    let reached = tokio::select! {
        _ = tokio::signal::ctrl_c() => false,
        changed = state.wait_for(|s| s.view != View::Loading) => {
            changed.map_err(|_| CliError::Internal { message: "session closed".into() })?;
            true
        }
    };
    spinner.finish_and_clear();
    Ok(reached)
}

// ── Dashboard ───────────────────────────────────────────────────────

/// Serialized form of one dashboard frame for non-table output.
#[derive(Serialize)]
struct Frame<'a> {
    username: String,
    stats: &'a CountStats,
    recent_records: &'a [CountRecord],
    devices: &'a [Device],
}

async fn run_dashboard(
    session: &Session<ApiClient>,
    format: &DateTimeFormat,
    color: bool,
    global: &GlobalOpts,
) {
    let mut snapshots = session.store().subscribe();
    let mut notices = session.subscribe_notifications();
    let mut liveness = tokio::time::interval(LIVENESS_REDRAW);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => if changed.is_err() { break },
            changed = notices.changed() => if changed.is_err() { break },
            _ = liveness.tick() => {}
        }
        let snapshot = snapshots.borrow_and_update().clone();
        draw(session, &snapshot, format, color, global);
    }
}

fn draw(
    session: &Session<ApiClient>,
    snapshot: &DashboardSnapshot,
    format: &DateTimeFormat,
    color: bool,
    global: &GlobalOpts,
) {
    let frame = Frame {
        username: session.username(),
        stats: &snapshot.stats,
        recent_records: &snapshot.recent_records,
        devices: &snapshot.devices,
    };
    let body = output::render_single(
        &global.output,
        &frame,
        |f| render_frame(f, snapshot, format, color),
        |f| f.stats.total_animals.to_string(),
    );

    let mut text = String::new();
    if io::stdout().is_terminal() {
        text.push_str("\x1b[2J\x1b[H");
    }
    text.push_str(&body);
    if let Some(notification) = session.notification() {
        text.push_str("\n\n");
        text.push_str(&output::notification_line(&notification, color));
    }

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{text}");
    let _ = stdout.flush();
}

fn render_frame(
    frame: &Frame<'_>,
    snapshot: &DashboardSnapshot,
    format: &DateTimeFormat,
    color: bool,
) -> String {
    let now = Utc::now();
    let records = if frame.recent_records.is_empty() {
        "No counts yet".to_owned()
    } else {
        let rows: Vec<_> = frame
            .recent_records
            .iter()
            .map(|r| RecordRow::new(r, format))
            .collect();
        output::render_table(&rows)
    };
    let devices = if frame.devices.is_empty() {
        "No devices registered".to_owned()
    } else {
        let rows: Vec<_> = frame
            .devices
            .iter()
            .map(|d| DeviceRow::new(d, format, now, color))
            .collect();
        output::render_table(&rows)
    };
    let updated = snapshot
        .last_refresh
        .as_ref()
        .map_or_else(|| "waiting for data".into(), |t| format!("updated {}", format.format(t)));

    format!(
        "herdcount | logged in as {}\n\n{}\n\nRecent counts\n{records}\n\nDevices\n{devices}\n\n{updated} | Ctrl-C to log out",
        frame.username,
        stats::detail(frame.stats),
    )
}

// ── Teardown ────────────────────────────────────────────────────────

fn finish(session: &Session<ApiClient>, color: bool) {
    session.logout();
    if let Some(notification) = session.notification() {
        eprintln!("{}", output::notification_line(&notification, color));
    }
    session.shutdown();
}
