// In-memory counting service for driving the session under a paused clock.
#![allow(dead_code, clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use herdcount_api::{
    CountRecord, CountStats, Credentials, Device, DeviceList, Error, LoginGrant, TodayCounts,
};
use herdcount_core::CountingService;
use secrecy::SecretString;

/// Canned outcome of one call.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Reject(u16, String),
    Unreachable,
}

impl<T> Reply<T> {
    pub fn reject(status: u16, message: &str) -> Self {
        Self::Reject(status, message.to_owned())
    }

    fn into_result(self) -> Result<T, Error> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Reject(status, message) => Err(Error::Api { status, message }),
            Self::Unreachable => Err(Error::Timeout { timeout_secs: 30 }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Endpoint {
    Register,
    Login,
    Stats,
    Records,
    Devices,
}

struct Behaviour {
    register: Reply<()>,
    login: Reply<String>,
    stats: Reply<CountStats>,
    records: Reply<Vec<CountRecord>>,
    devices: Reply<Vec<Device>>,
    delays: [Duration; 5],
}

#[derive(Default)]
struct Calls([AtomicUsize; 5]);

struct Shared {
    behaviour: Mutex<Behaviour>,
    calls: Calls,
}

/// Cloneable handle; the test keeps one clone, the session owns another.
#[derive(Clone)]
pub struct FakeService(Arc<Shared>);

impl FakeService {
    /// Every call succeeds immediately. Login issues `abc123`.
    pub fn new() -> Self {
        Self(Arc::new(Shared {
            behaviour: Mutex::new(Behaviour {
                register: Reply::Ok(()),
                login: Reply::Ok("abc123".into()),
                stats: Reply::Ok(CountStats::default()),
                records: Reply::Ok(Vec::new()),
                devices: Reply::Ok(Vec::new()),
                delays: [Duration::ZERO; 5],
            }),
            calls: Calls::default(),
        }))
    }

    fn with<R>(&self, f: impl FnOnce(&mut Behaviour) -> R) -> R {
        f(&mut self.0.behaviour.lock().unwrap())
    }

    pub fn set_register(&self, reply: Reply<()>) {
        self.with(|b| b.register = reply);
    }

    pub fn set_login(&self, reply: Reply<String>) {
        self.with(|b| b.login = reply);
    }

    pub fn set_stats(&self, reply: Reply<CountStats>) {
        self.with(|b| b.stats = reply);
    }

    pub fn set_records(&self, reply: Reply<Vec<CountRecord>>) {
        self.with(|b| b.records = reply);
    }

    pub fn set_devices(&self, reply: Reply<Vec<Device>>) {
        self.with(|b| b.devices = reply);
    }

    pub fn set_delay(&self, endpoint: Endpoint, delay: Duration) {
        self.with(|b| b.delays[endpoint as usize] = delay);
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.0.calls.0[endpoint as usize].load(Ordering::SeqCst)
    }

    async fn call<T: Clone>(
        &self,
        endpoint: Endpoint,
        pick: impl FnOnce(&Behaviour) -> Reply<T>,
    ) -> Result<T, Error> {
        self.0.calls.0[endpoint as usize].fetch_add(1, Ordering::SeqCst);
        let (reply, delay) = {
            let behaviour = self.0.behaviour.lock().unwrap();
            (pick(&behaviour), behaviour.delays[endpoint as usize])
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply.into_result()
    }
}

impl CountingService for FakeService {
    async fn register(&self, _credentials: &Credentials) -> Result<Option<String>, Error> {
        self.call(Endpoint::Register, |b| b.register.clone())
            .await
            .map(|()| Some("Usuário cadastrado com sucesso".into()))
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, Error> {
        let username = credentials.username.clone();
        self.call(Endpoint::Login, |b| b.login.clone())
            .await
            .map(|token| LoginGrant {
                token: SecretString::from(token),
                username: Some(username),
                message: None,
            })
    }

    async fn count_stats(&self, _token: &SecretString) -> Result<CountStats, Error> {
        self.call(Endpoint::Stats, |b| b.stats.clone()).await
    }

    async fn today_counts(&self, _token: &SecretString) -> Result<TodayCounts, Error> {
        let counts = self.call(Endpoint::Records, |b| b.records.clone()).await?;
        Ok(TodayCounts {
            total_today: counts.iter().map(|c| u64::from(c.count)).sum(),
            records: counts.len() as u64,
            counts,
        })
    }

    async fn list_devices(&self, _token: &SecretString) -> Result<DeviceList, Error> {
        let devices = self.call(Endpoint::Devices, |b| b.devices.clone()).await?;
        Ok(DeviceList {
            total: devices.len() as u64,
            devices,
        })
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn stats(total_animals: u64) -> CountStats {
    CountStats {
        total_animals,
        today: 1,
        this_week: 2,
        this_month: 3,
        total_records: 4,
    }
}

pub fn record(id: &str, minute: u32) -> CountRecord {
    CountRecord {
        id: id.into(),
        count: 1,
        animal_type: "bovino".into(),
        device_id: "d1".into(),
        timestamp: at_minute(minute),
    }
}

pub fn device(id: &str) -> Device {
    Device {
        id: id.into(),
        name: format!("Gate {id}"),
        location: "North field".into(),
        status: Some("ativo".into()),
        registered_at: None,
        last_seen: Utc::now(),
    }
}

fn at_minute(minute: u32) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-15T08:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
        + chrono::TimeDelta::minutes(i64::from(minute))
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
