// Wire types for the counting service.
//
// Field names follow the service's snake_case JSON verbatim. Optional
// summary fields (`total`, `records`, ...) default to zero so a trimmed-down
// service still deserializes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate counters from `GET /counts/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountStats {
    pub total_animals: u64,
    pub today: u64,
    pub this_week: u64,
    pub this_month: u64,
    pub total_records: u64,
}

/// A single detection reported by a sensor device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRecord {
    pub id: String,
    pub count: u32,
    pub animal_type: String,
    pub device_id: String,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// A registered sensor device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    /// Administrative status as stored by the service (e.g. `"ativo"`).
    /// Liveness is derived from `last_seen`, never from this field.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, with = "crate::timestamp::option")]
    pub registered_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::timestamp")]
    pub last_seen: DateTime<Utc>,
}

/// `GET /counts/today` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayCounts {
    pub counts: Vec<CountRecord>,
    #[serde(default)]
    pub total_today: u64,
    #[serde(default)]
    pub records: u64,
}

/// `GET /counts` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountList {
    pub counts: Vec<CountRecord>,
    #[serde(default)]
    pub total: u64,
}

/// `GET /devices` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceList {
    pub devices: Vec<Device>,
    #[serde(default)]
    pub total: u64,
}

/// `GET /verify` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    #[serde(default)]
    pub message: String,
    pub username: String,
}

/// `GET /test` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ping {
    pub message: String,
    /// Server-local time, as sent. Not normalized: the probe only echoes it.
    #[serde(default)]
    pub timestamp: String,
}

/// Body for `POST /count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCount {
    pub device_id: String,
    pub count: u32,
    pub animal_type: String,
}

/// Body for `POST /devices/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDevice {
    pub name: String,
    pub location: String,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /count` acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CountCreated {
    pub data: CountRecord,
}

/// `POST /devices/register` acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DeviceCreated {
    pub device: Device,
}
