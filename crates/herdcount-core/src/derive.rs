//! Pure evaluators over dashboard data.
//!
//! Nothing here touches the network or the session; callers pass the
//! clock in where it matters so the boundaries stay testable.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use herdcount_api::CountRecord;

use crate::error::CoreError;

/// A device is active while its last heartbeat is younger than this.
pub const LIVENESS_WINDOW_SECS: i64 = 5 * 60;

/// Recent-records list length.
pub const RECENT_RECORDS_LIMIT: usize = 10;

/// Day-first, 24-hour pattern used when none is configured.
pub const DEFAULT_DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// `true` iff `now - last_seen` is strictly less than five minutes.
///
/// Exactly five minutes old counts as inactive. A `last_seen` in the
/// future (clock skew) counts as active.
pub fn is_device_active_at(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(last_seen) < TimeDelta::seconds(LIVENESS_WINDOW_SECS)
}

/// [`is_device_active_at`] against the system clock.
pub fn is_device_active(last_seen: DateTime<Utc>) -> bool {
    is_device_active_at(last_seen, Utc::now())
}

/// Keep the newest [`RECENT_RECORDS_LIMIT`] records, newest first.
///
/// Records are ordered by timestamp before truncating, so the result does
/// not depend on the order the service returned them in. Equal timestamps
/// keep their input order relative to each other (last in input = newest).
pub fn recent_records(mut records: Vec<CountRecord>) -> Vec<CountRecord> {
    records.sort_by_key(|r| r.timestamp);
    let skip = records.len().saturating_sub(RECENT_RECORDS_LIMIT);
    records.drain(..skip);
    records.reverse();
    records
}

/// A validated `strftime` pattern for rendering instants.
///
/// Validation up front means formatting can never fail later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeFormat(String);

impl DateTimeFormat {
    pub fn parse(pattern: &str) -> Result<Self, CoreError> {
        if pattern.is_empty() {
            return Err(CoreError::Config {
                message: "datetime format must not be empty".into(),
            });
        }
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(CoreError::Config {
                message: format!("invalid datetime format: {pattern:?}"),
            });
        }
        Ok(Self(pattern.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render in the machine's local timezone.
    pub fn format(&self, instant: &DateTime<Utc>) -> String {
        self.format_in(instant, &Local)
    }

    /// Render in an explicit timezone.
    pub fn format_in<Tz>(&self, instant: &DateTime<Utc>, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        instant.with_timezone(tz).format(&self.0).to_string()
    }
}

impl Default for DateTimeFormat {
    fn default() -> Self {
        Self(DEFAULT_DATETIME_FORMAT.to_owned())
    }
}

/// Render an instant as local day/month/year hour:minute:second.
pub fn format_date_time(instant: &DateTime<Utc>) -> String {
    DateTimeFormat::default().format(instant)
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_718_445_000 + secs, 0).expect("in range")
    }

    fn record(id: &str, secs: i64) -> CountRecord {
        CountRecord {
            id: id.into(),
            count: 1,
            animal_type: "bovino".into(),
            device_id: "d1".into(),
            timestamp: at(secs),
        }
    }

    #[test]
    fn liveness_window_is_exclusive() {
        let now = at(1_000);
        assert!(is_device_active_at(at(1_000 - 299), now));
        assert!(!is_device_active_at(at(1_000 - 300), now));
        assert!(!is_device_active_at(at(1_000 - 301), now));
    }

    #[test]
    fn future_heartbeat_counts_as_active() {
        assert!(is_device_active_at(at(60), at(0)));
    }

    #[test]
    fn recent_records_keeps_newest_ten_newest_first() {
        let records: Vec<_> = (0..15).map(|i| record(&format!("c{i}"), i)).collect();
        let ids: Vec<_> = recent_records(records)
            .into_iter()
            .map(|r| r.id)
            .collect();
        let expected: Vec<_> = (5..15).rev().map(|i| format!("c{i}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn recent_records_ignores_input_order() {
        let records = vec![record("b", 20), record("a", 10), record("c", 30)];
        let ids: Vec<_> = recent_records(records)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[test]
    fn recent_records_short_input() {
        assert!(recent_records(Vec::new()).is_empty());
        assert_eq!(recent_records(vec![record("only", 0)]).len(), 1);
    }

    #[test]
    fn default_format_is_day_first() {
        let instant = DateTime::parse_from_rfc3339("2024-06-15T10:30:05Z")
            .expect("valid")
            .with_timezone(&Utc);
        let utc = FixedOffset::east_opt(0).expect("valid offset");
        let minus_three = FixedOffset::west_opt(3 * 3600).expect("valid offset");

        let format = DateTimeFormat::default();
        assert_eq!(format.format_in(&instant, &utc), "15/06/2024 10:30:05");
        assert_eq!(format.format_in(&instant, &minus_three), "15/06/2024 07:30:05");
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert!(DateTimeFormat::parse("%Y-%m-%d %H:%M").is_ok());
        assert!(DateTimeFormat::parse("%Q").is_err());
        assert!(DateTimeFormat::parse("").is_err());
    }
}
