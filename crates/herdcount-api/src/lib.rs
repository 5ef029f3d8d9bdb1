// herdcount-api: Async Rust client for the herdcount counting service

pub mod auth;
pub mod client;
pub mod counts;
pub mod devices;
pub mod error;
pub mod timestamp;
pub mod transport;
pub mod types;

pub use auth::{Credentials, LoginGrant};
pub use client::ApiClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    CountList, CountRecord, CountStats, Device, DeviceList, NewCount, NewDevice, Ping,
    TodayCounts, Verification,
};
