// ── Dashboard synchronizer ──
//
// While the session sits in the dashboard view, one background task
// refreshes the store immediately and then every poll interval. The three
// slices are fetched concurrently and applied independently: a failure
// leaves that slice as it was and is only logged.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::SecretString;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::service::CountingService;
use crate::store::{DashboardStore, Generation};

/// What happened to one slice during a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SliceOutcome {
    Applied,
    /// The fetch failed; the slice kept its previous value.
    Failed,
    /// The fetch succeeded but the session was torn down meanwhile.
    Discarded,
}

impl SliceOutcome {
    fn from_applied(applied: bool) -> Self {
        if applied { Self::Applied } else { Self::Discarded }
    }
}

/// Per-slice result of one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub stats: SliceOutcome,
    pub records: SliceOutcome,
    pub devices: SliceOutcome,
}

impl RefreshReport {
    pub fn failures(&self) -> usize {
        [self.stats, self.records, self.devices]
            .into_iter()
            .filter(|o| *o == SliceOutcome::Failed)
            .count()
    }
}

struct ActivePoll {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the dashboard poll task.
pub struct DashboardSync<S: CountingService> {
    service: Arc<S>,
    store: Arc<DashboardStore>,
    poll_interval: Duration,
    parent: CancellationToken,
    active: Mutex<Option<ActivePoll>>,
}

impl<S: CountingService> DashboardSync<S> {
    /// Poll tasks run under child tokens of `parent`; cancelling it stops them.
    pub fn new(
        service: Arc<S>,
        store: Arc<DashboardStore>,
        poll_interval: Duration,
        parent: &CancellationToken,
    ) -> Self {
        Self {
            service,
            store,
            poll_interval,
            parent: parent.clone(),
            active: Mutex::new(None),
        }
    }

    /// Start polling with `token`. A running poll is replaced.
    ///
    /// Writes are tagged with the store's current generation.
    pub fn activate(&self, token: SecretString) {
        let mut active = self.active.lock().expect("sync lock poisoned");
        if let Some(previous) = active.take() {
            previous.cancel.cancel();
            previous.handle.abort();
        }

        let cancel = self.parent.child_token();
        let generation = self.store.generation();
        let handle = tokio::spawn(poll_task(
            Arc::clone(&self.service),
            Arc::clone(&self.store),
            token,
            generation,
            self.poll_interval,
            cancel.clone(),
        ));
        debug!(interval_ms = self.poll_interval.as_millis(), "dashboard sync activated");
        *active = Some(ActivePoll { cancel, handle });
    }

    /// Stop polling. In-flight fetches are dropped without touching the store.
    pub fn deactivate(&self) {
        let previous = self.active.lock().expect("sync lock poisoned").take();
        if let Some(previous) = previous {
            previous.cancel.cancel();
            previous.handle.abort();
            debug!("dashboard sync deactivated");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
            .lock()
            .expect("sync lock poisoned")
            .as_ref()
            .is_some_and(|poll| !poll.handle.is_finished())
    }
}

impl<S: CountingService> Drop for DashboardSync<S> {
    fn drop(&mut self) {
        if let Some(poll) = self.active.get_mut().ok().and_then(Option::take) {
            poll.cancel.cancel();
            poll.handle.abort();
        }
    }
}

// ── Background task ──────────────────────────────────────────────

async fn poll_task<S: CountingService>(
    service: Arc<S>,
    store: Arc<DashboardStore>,
    token: SecretString,
    generation: Generation,
    period: Duration,
    cancel: CancellationToken,
) {
    // First tick completes immediately: that is the activation refresh.
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            report = refresh(service.as_ref(), &store, &token, generation) => {
                debug!(failures = report.failures(), "dashboard refreshed");
            }
        }
    }

    debug!("dashboard poll stopped");
}

/// Fetch all three slices concurrently and apply each one that succeeds.
pub async fn refresh<S: CountingService>(
    service: &S,
    store: &DashboardStore,
    token: &SecretString,
    generation: Generation,
) -> RefreshReport {
    let stats = async {
        match service.count_stats(token).await {
            Ok(stats) => SliceOutcome::from_applied(store.apply_stats(generation, stats)),
            Err(e) => {
                warn!(slice = "stats", error = %e, "dashboard fetch failed");
                SliceOutcome::Failed
            }
        }
    };

    let records = async {
        match service.today_counts(token).await {
            Ok(today) => SliceOutcome::from_applied(store.apply_records(generation, today.counts)),
            Err(e) => {
                warn!(slice = "records", error = %e, "dashboard fetch failed");
                SliceOutcome::Failed
            }
        }
    };

    let devices = async {
        match service.list_devices(token).await {
            Ok(list) => SliceOutcome::from_applied(store.apply_devices(generation, list.devices)),
            Err(e) => {
                warn!(slice = "devices", error = %e, "dashboard fetch failed");
                SliceOutcome::Failed
            }
        }
    };

    let (stats, records, devices) = tokio::join!(stats, records, devices);
    RefreshReport {
        stats,
        records,
        devices,
    }
}
