// ── Transient notifications ──
//
// At most one notification is visible. Each `show` replaces the current
// one and re-arms the clear timer; the previous timer is aborted and,
// should it still fire, only clears the notification it was armed for.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Notification tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

/// A visible message and the instant it disappears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Monotonic per-notifier sequence number.
    pub id: u64,
    pub text: String,
    pub severity: Severity,
    pub expires_at: Instant,
}

/// Single-slot notification holder with auto-clear.
pub struct Notifier {
    current: Arc<watch::Sender<Option<Notification>>>,
    ttl: Duration,
    next_id: AtomicU64,
    pending_clear: Mutex<Option<JoinHandle<()>>>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
            ttl,
            next_id: AtomicU64::new(1),
            pending_clear: Mutex::new(None),
        }
    }

    /// Replace the current notification and schedule its removal.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn show(&self, text: impl Into<String>, severity: Severity) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let expires_at = Instant::now() + self.ttl;
        let notification = Notification {
            id,
            text: text.into(),
            severity,
            expires_at,
        };

        let mut pending = self.pending_clear.lock().expect("notifier lock poisoned");
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        self.current.send_replace(Some(notification));

        let current = Arc::clone(&self.current);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(expires_at).await;
            current.send_if_modified(|slot| {
                if slot.as_ref().is_some_and(|n| n.id == id) {
                    *slot = None;
                    true
                } else {
                    false
                }
            });
        }));
    }

    /// Drop the current notification, if any.
    pub fn clear(&self) {
        if let Some(handle) = self
            .pending_clear
            .lock()
            .expect("notifier lock poisoned")
            .take()
        {
            handle.abort();
        }
        self.current.send_if_modified(|slot| slot.take().is_some());
    }

    pub fn current(&self) -> Option<Notification> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.current.subscribe()
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        if let Some(handle) = self.pending_clear.get_mut().ok().and_then(Option::take) {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(3000);

    fn text(notifier: &Notifier) -> Option<String> {
        notifier.current().map(|n| n.text)
    }

    #[tokio::test(start_paused = true)]
    async fn clears_after_ttl() {
        let notifier = Notifier::new(TTL);
        notifier.show("saved", Severity::Success);

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert_eq!(text(&notifier).as_deref(), Some("saved"));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(notifier.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_message_restarts_timer() {
        let notifier = Notifier::new(TTL);
        notifier.show("A", Severity::Success);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        notifier.show("B", Severity::Error);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let visible = notifier.current().expect("B still visible at 3500ms");
        assert_eq!(visible.text, "B");
        assert_eq!(visible.severity, Severity::Error);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(notifier.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_is_immediate() {
        let notifier = Notifier::new(TTL);
        notifier.show("gone", Severity::Error);
        notifier.clear();
        assert_eq!(notifier.current(), None);

        // Clearing nothing is a no-op.
        notifier.clear();
        assert_eq!(notifier.current(), None);
    }

    #[test]
    fn severity_renders_lowercase() {
        assert_eq!(Severity::Success.to_string(), "success");
        assert_eq!(Severity::Error.to_string(), "error");
    }
}
