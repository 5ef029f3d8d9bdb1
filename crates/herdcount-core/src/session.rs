// ── Session state machine ──
//
// Views: Login ⇄ Register, Login → Loading → Dashboard, any → Login on
// logout. The token lives only in memory. Every change is published on a
// watch channel and reconciled against the dashboard synchronizer, so the
// poll loop runs exactly while the view is Dashboard and a token is held.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use herdcount_api::{ApiClient, Credentials, Error as ApiError};
use secrecy::SecretString;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{SessionConfig, Timings};
use crate::error::CoreError;
use crate::notify::{Notification, Notifier, Severity};
use crate::service::CountingService;
use crate::store::{DashboardSnapshot, DashboardStore};
use crate::sync::DashboardSync;

const REGISTERED_MESSAGE: &str = "Registration successful! You can now log in.";
const LOGGED_OUT_MESSAGE: &str = "Logged out successfully.";
const MISSING_FIELDS_MESSAGE: &str = "Username and password are required.";

/// Which screen the session is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum View {
    #[default]
    Login,
    Register,
    /// Transitional pause between a successful login and the dashboard.
    Loading,
    Dashboard,
}

/// Published session state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub token: Option<SecretString>,
    /// Empty until a login succeeds.
    pub username: String,
    pub view: View,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

struct Scheduled {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct SessionInner<S: CountingService> {
    service: Arc<S>,
    timings: Timings,
    state: watch::Sender<SessionState>,
    form: Mutex<Credentials>,
    busy: AtomicBool,
    notifier: Notifier,
    store: Arc<DashboardStore>,
    sync: DashboardSync<S>,
    loading: Mutex<Option<Scheduled>>,
    /// Bumped by logout and shutdown. Held across every step that moves a
    /// login towards the dashboard, so a teardown is never interleaved
    /// with one.
    epoch: Mutex<u64>,
    cancel: CancellationToken,
}

impl<S: CountingService> Drop for SessionInner<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Authentication state machine and owner of the dashboard lifecycle.
///
/// Cheaply cloneable; clones share the same session.
pub struct Session<S: CountingService> {
    inner: Arc<SessionInner<S>>,
}

impl<S: CountingService> Clone for Session<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Session<ApiClient> {
    /// Build an HTTP-backed session from connection settings.
    pub fn connect(config: &SessionConfig) -> Result<Self, CoreError> {
        let client = config.build_client()?;
        Ok(Self::new(client, config.timings))
    }
}

impl<S: CountingService> Session<S> {
    pub fn new(service: S, timings: Timings) -> Self {
        Self::with_store(service, timings, Arc::new(DashboardStore::new()))
    }

    /// Use an externally owned store (shared with a renderer, say).
    pub fn with_store(service: S, timings: Timings, store: Arc<DashboardStore>) -> Self {
        let service = Arc::new(service);
        let cancel = CancellationToken::new();
        let sync = DashboardSync::new(
            Arc::clone(&service),
            Arc::clone(&store),
            timings.poll_interval,
            &cancel,
        );
        let (state, _) = watch::channel(SessionState::default());

        Self {
            inner: Arc::new(SessionInner {
                service,
                timings,
                state,
                form: Mutex::new(Credentials::new("", "")),
                busy: AtomicBool::new(false),
                notifier: Notifier::new(timings.notification_ttl),
                store,
                sync,
                loading: Mutex::new(None),
                epoch: Mutex::new(0),
                cancel,
            }),
        }
    }

    // ── State access ─────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn view(&self) -> View {
        self.inner.state.borrow().view
    }

    pub fn username(&self) -> String {
        self.inner.state.borrow().username.clone()
    }

    pub fn token(&self) -> Option<SecretString> {
        self.inner.state.borrow().token.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn notification(&self) -> Option<Notification> {
        self.inner.notifier.current()
    }

    pub fn subscribe_notifications(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.notifier.subscribe()
    }

    pub fn store(&self) -> &Arc<DashboardStore> {
        &self.inner.store
    }

    pub fn dashboard(&self) -> DashboardSnapshot {
        self.inner.store.snapshot()
    }

    /// A submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    /// The dashboard poll loop is running.
    pub fn is_syncing(&self) -> bool {
        self.inner.sync.is_active()
    }

    // ── Form ─────────────────────────────────────────────────────────

    pub fn set_username(&self, username: impl Into<String>) {
        self.form().username = username.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.form().password = SecretString::from(password.into());
    }

    /// Current form contents.
    pub fn form_credentials(&self) -> Credentials {
        self.form().clone()
    }

    fn form(&self) -> MutexGuard<'_, Credentials> {
        self.inner.form.lock().expect("form lock poisoned")
    }

    fn clear_password(&self) {
        self.form().password = SecretString::from(String::new());
    }

    // ── View toggles ─────────────────────────────────────────────────

    pub fn show_register(&self) -> Result<(), CoreError> {
        self.switch_form(View::Login, View::Register, "show the register form")
    }

    pub fn show_login(&self) -> Result<(), CoreError> {
        self.switch_form(View::Register, View::Login, "show the login form")
    }

    /// Flip between the login and register forms.
    pub fn toggle_form(&self) -> Result<View, CoreError> {
        match self.view() {
            View::Login => self.show_register().map(|()| View::Register),
            View::Register => self.show_login().map(|()| View::Login),
            from => Err(CoreError::InvalidTransition {
                from,
                operation: "toggle the form",
            }),
        }
    }

    fn switch_form(&self, from: View, to: View, operation: &'static str) -> Result<(), CoreError> {
        let current = self.view();
        if current != from && current != to {
            return Err(CoreError::InvalidTransition {
                from: current,
                operation,
            });
        }
        self.inner.state.send_if_modified(|s| {
            if s.view == from {
                s.view = to;
                true
            } else {
                false
            }
        });
        self.inner.notifier.clear();
        self.clear_password();
        Ok(())
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Submit the form for the current view.
    ///
    /// Rejected with [`CoreError::Busy`] while a previous submission is in
    /// flight; the rejected call makes no service request.
    pub async fn submit(&self) -> Result<(), CoreError> {
        let _busy = BusyGuard::acquire(&self.inner.busy).ok_or(CoreError::Busy)?;
        let credentials = self.form_credentials();
        match self.view() {
            View::Login => self.login(credentials).await.map(|_| ()),
            View::Register => self.register(credentials).await,
            from => Err(CoreError::InvalidTransition {
                from,
                operation: "submit",
            }),
        }
    }

    /// Log in. On success the session enters Loading and moves to the
    /// dashboard once the loading delay has elapsed.
    pub async fn login(&self, credentials: Credentials) -> Result<SecretString, CoreError> {
        self.expect_view(View::Login, "log in")?;
        self.require_complete(&credentials)?;

        let started = *self.epoch();
        let result = self.inner.service.login(&credentials).await;

        let epoch = self.epoch();
        if *epoch != started {
            debug!("login completed after logout; discarding response");
            return Err(CoreError::Cancelled { operation: "login" });
        }
        let grant = match result {
            Ok(grant) => grant,
            Err(e) => return Err(self.report_failure("login", e)),
        };

        let username = grant
            .username
            .filter(|name| !name.is_empty())
            .unwrap_or(credentials.username);
        let token = grant.token;

        let accepted = self.inner.state.send_if_modified(|s| {
            if s.view != View::Login {
                return false;
            }
            s.token = Some(token.clone());
            s.username.clone_from(&username);
            s.view = View::Loading;
            true
        });
        if !accepted {
            debug!("login completed after leaving the login view; discarding token");
            return Err(CoreError::InvalidTransition {
                from: self.view(),
                operation: "log in",
            });
        }

        info!(%username, "logged in");
        self.schedule_dashboard(*epoch);
        Ok(token)
    }

    /// Create an account. On success the session returns to the login form.
    pub async fn register(&self, credentials: Credentials) -> Result<(), CoreError> {
        self.expect_view(View::Register, "register")?;
        self.require_complete(&credentials)?;

        if let Err(e) = self.inner.service.register(&credentials).await {
            return Err(self.report_failure("registration", e));
        }

        info!(username = %credentials.username, "account registered");
        self.inner.notifier.show(REGISTERED_MESSAGE, Severity::Success);
        self.inner.state.send_if_modified(|s| {
            if s.view == View::Register {
                s.view = View::Login;
                true
            } else {
                false
            }
        });
        self.clear_password();
        Ok(())
    }

    /// Tear the session down: stop the loading transition and the poll
    /// loop, reset the dashboard, forget the token. Idempotent.
    pub fn logout(&self) {
        {
            let _epoch = self.end_epoch();
            self.inner.store.reset();
            let mut form = self.form();
            form.username.clear();
            form.password = SecretString::from(String::new());
            drop(form);
            self.inner.state.send_replace(SessionState::default());
        }
        self.inner
            .notifier
            .show(LOGGED_OUT_MESSAGE, Severity::Success);
        info!("logged out");
    }

    /// Stop every background task without publishing a notification.
    pub fn shutdown(&self) {
        drop(self.end_epoch());
        self.inner.notifier.clear();
        self.inner.cancel.cancel();
    }

    // ── Internals ────────────────────────────────────────────────────

    fn expect_view(&self, expected: View, operation: &'static str) -> Result<(), CoreError> {
        let from = self.view();
        if from == expected {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition { from, operation })
        }
    }

    fn require_complete(&self, credentials: &Credentials) -> Result<(), CoreError> {
        if credentials.is_complete() {
            return Ok(());
        }
        self.inner
            .notifier
            .show(MISSING_FIELDS_MESSAGE, Severity::Error);
        Err(CoreError::ValidationFailed {
            message: MISSING_FIELDS_MESSAGE.into(),
        })
    }

    fn report_failure(&self, action: &str, err: ApiError) -> CoreError {
        if err.is_transport() {
            warn!(error = %err, "{action} failed: service unreachable");
        } else {
            debug!(error = %err, "{action} rejected");
        }
        let err = CoreError::from(err);
        self.inner.notifier.show(err.user_message(), Severity::Error);
        err
    }

    fn epoch(&self) -> MutexGuard<'_, u64> {
        self.inner.epoch.lock().expect("epoch lock poisoned")
    }

    /// Invalidate the current login and stop its background work. The
    /// returned guard keeps a new login from being accepted meanwhile.
    fn end_epoch(&self) -> MutexGuard<'_, u64> {
        let mut epoch = self.epoch();
        *epoch += 1;
        self.cancel_loading();
        self.inner.sync.deactivate();
        epoch
    }

    fn schedule_dashboard(&self, epoch: u64) {
        let cancel = self.inner.cancel.child_token();
        let delay = self.inner.timings.loading_delay;
        let session = self.clone();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = task_cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => session.enter_dashboard(epoch),
            }
        });

        let previous = self
            .inner
            .loading
            .lock()
            .expect("loading lock poisoned")
            .replace(Scheduled { cancel, handle });
        if let Some(previous) = previous {
            previous.cancel.cancel();
            previous.handle.abort();
        }
    }

    fn cancel_loading(&self) {
        let scheduled = self
            .inner
            .loading
            .lock()
            .expect("loading lock poisoned")
            .take();
        if let Some(scheduled) = scheduled {
            scheduled.cancel.cancel();
            scheduled.handle.abort();
        }
    }

    fn enter_dashboard(&self, started: u64) {
        let epoch = self.epoch();
        if *epoch != started {
            debug!("loading transition outlived its login");
            return;
        }

        let mut token = None;
        self.inner.state.send_if_modified(|s| {
            if s.view == View::Loading && s.token.is_some() {
                s.view = View::Dashboard;
                token.clone_from(&s.token);
                true
            } else {
                false
            }
        });
        let Some(token) = token else {
            debug!("loading transition superseded");
            return;
        };

        self.clear_password();
        self.inner.sync.activate(token);
        drop(epoch);
        debug!("entered dashboard");
    }
}

/// Holds the busy flag for the duration of a submission.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
