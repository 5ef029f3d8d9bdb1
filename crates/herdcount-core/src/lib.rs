//! Session and live-dashboard layer between `herdcount-api` and UI consumers.
//!
//! - **[`Session`]**: Authentication state machine
//!   (`login ⇄ register`, `login → loading → dashboard`, `→ login` on
//!   logout). Owns the bearer token in memory only, drives the dashboard
//!   synchronizer and raises transient notifications.
//!
//! - **[`DashboardStore`]**: Injectable store of the three dashboard
//!   slices (stats, recent records, devices) published through a
//!   `tokio::sync::watch` channel. Stale writes from a torn-down session
//!   are rejected by generation.
//!
//! - **[`DashboardSync`]**: Poll loop that refreshes the store
//!   immediately and then on a fixed interval while the session sits in
//!   the dashboard view. Each slice is fetched and applied independently.
//!
//! - **[`Notifier`]**: At most one live notification with an auto-clear
//!   timer; a newer message always wins over a pending clear.
//!
//! - **[`derive`]**: Pure evaluators: device liveness, timestamp
//!   formatting, newest-first record truncation.
//!
//! The service is reached through the [`CountingService`] trait, implemented
//! for [`herdcount_api::ApiClient`].

pub mod config;
pub mod derive;
pub mod error;
pub mod notify;
pub mod service;
pub mod session;
pub mod store;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{SessionConfig, Timings, TlsVerification};
pub use derive::{DateTimeFormat, format_date_time, is_device_active, recent_records};
pub use error::CoreError;
pub use notify::{Notification, Notifier, Severity};
pub use service::CountingService;
pub use session::{Session, SessionState, View};
pub use store::{DashboardSnapshot, DashboardStore, Generation};
pub use sync::{DashboardSync, RefreshReport, SliceOutcome};

// Wire types consumers render directly.
pub use herdcount_api::{ApiClient, CountRecord, CountStats, Credentials, Device};
