// ── Dashboard store ──
//
// Holds the three dashboard slices and publishes them through a single
// watch channel. Every write carries the generation it was started under;
// `reset` bumps the generation, so a response that lands after logout
// is discarded instead of resurrecting the previous session's data.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use herdcount_api::{CountRecord, CountStats, Device};
use tokio::sync::watch;

use crate::derive::recent_records;

/// Identifies the session lifetime a write belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

/// What the dashboard renders. Cheap to clone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub stats: CountStats,
    /// Newest first, at most ten.
    pub recent_records: Arc<Vec<CountRecord>>,
    pub devices: Arc<Vec<Device>>,
    /// When any slice last changed.
    pub last_refresh: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    /// All slices at their post-logout baseline.
    pub fn is_empty(&self) -> bool {
        self.stats == CountStats::default()
            && self.recent_records.is_empty()
            && self.devices.is_empty()
    }
}

/// Shared dashboard state, injectable into the session and the poller.
pub struct DashboardStore {
    generation: Mutex<u64>,
    snapshot: watch::Sender<DashboardSnapshot>,
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(DashboardSnapshot::default());
        Self {
            generation: Mutex::new(0),
            snapshot,
        }
    }

    pub fn generation(&self) -> Generation {
        Generation(*self.generation.lock().expect("store lock poisoned"))
    }

    /// Restore the empty baseline and invalidate every in-flight write.
    pub fn reset(&self) -> Generation {
        let mut generation = self.generation.lock().expect("store lock poisoned");
        *generation += 1;
        self.snapshot.send_replace(DashboardSnapshot::default());
        Generation(*generation)
    }

    // ── Slice writers ───────────────────────────────────────────────
    //
    // Each returns `false` when the write was discarded as stale.

    pub fn apply_stats(&self, generation: Generation, stats: CountStats) -> bool {
        self.apply(generation, |snap| snap.stats = stats)
    }

    /// Store the newest ten of `records`, newest first.
    pub fn apply_records(&self, generation: Generation, records: Vec<CountRecord>) -> bool {
        let recent = Arc::new(recent_records(records));
        self.apply(generation, |snap| snap.recent_records = recent)
    }

    pub fn apply_devices(&self, generation: Generation, devices: Vec<Device>) -> bool {
        let devices = Arc::new(devices);
        self.apply(generation, |snap| snap.devices = devices)
    }

    fn apply(&self, generation: Generation, write: impl FnOnce(&mut DashboardSnapshot)) -> bool {
        let current = self.generation.lock().expect("store lock poisoned");
        if generation.0 != *current {
            return false;
        }
        self.snapshot.send_modify(|snap| {
            write(snap);
            snap.last_refresh = Some(Utc::now());
        });
        true
    }

    // ── Readers ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshot.subscribe()
    }
}
