//! # Discovery Session
//!
//! Drives one bounded scan at a time through a [`DiscoveryBackend`].
//!
//! ## Lifecycle
//! `Idle -> Discovering -> Idle`. A start request while discovering is ignored.
//! An accepted scan:
//! 1. starts the backend,
//! 2. waits out the collection window,
//! 3. reads the entry count and materializes every complete entry,
//! 4. stops the backend, whatever happened before, and only then goes idle.
//!
//! Backend calls are blocking and run on tokio's blocking pool, one at a time. A
//! call whose caller stopped waiting (timeout, cancellation) still holds the
//! backend until it returns, and cleanup queues behind it, so the session never
//! reports idle while the backend is busy. Everything the observer should see
//! leaves through the event channel returned by [`DiscoverySession::new`].

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use flock_common::backend::{BackendError, DiscoveryBackend};
use flock_common::config::Config;
use flock_common::observer::SessionEvent;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::Mutex as CallLock;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{self, JoinError, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use crate::materialize;
use crate::status;

/// Result of one finished scan: the number of devices reported, or why the scan
/// failed. The failure has already been reported as status text.
pub type ScanOutcome = Result<usize, SessionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Discovering,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("failed to start discovery: {0}")]
    StartFailed(BackendError),
    #[error("error getting discovered devices: {0}")]
    CollectFailed(BackendError),
    #[error("error during discovery: {0}")]
    Fault(String),
    #[error("{call} did not return within {}", status::human_duration(.after))]
    TimedOut { call: &'static str, after: Duration },
}

impl From<JoinError> for SessionError {
    fn from(err: JoinError) -> Self {
        if !err.is_panic() {
            return SessionError::Fault(err.to_string());
        }
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|msg| msg.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "backend panicked".to_string());
        SessionError::Fault(message)
    }
}

struct Settings {
    service_type: Option<String>,
    window: Duration,
    collect_timeout: Duration,
    call_timeout: Option<Duration>,
}

impl From<&Config> for Settings {
    fn from(cfg: &Config) -> Self {
        Self {
            service_type: cfg.service_type.clone(),
            window: cfg.window,
            collect_timeout: cfg.collect_timeout,
            call_timeout: cfg.call_timeout,
        }
    }
}

struct Shared {
    backend: Arc<dyn DiscoveryBackend>,
    /// Held for the whole of every backend call.
    calls: Arc<CallLock<()>>,
    state: Mutex<SessionState>,
    events: UnboundedSender<SessionEvent>,
    settings: Settings,
}

pub struct DiscoverySession {
    shared: Arc<Shared>,
}

impl DiscoverySession {
    /// Creates an idle session over `backend`. The receiver carries every
    /// notification meant for the observer; feed it to [`crate::dispatch`].
    pub fn new(
        backend: Arc<dyn DiscoveryBackend>,
        cfg: &Config,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let shared = Shared {
            backend,
            calls: Arc::new(CallLock::new(())),
            state: Mutex::new(SessionState::Idle),
            events,
            settings: Settings::from(cfg),
        };
        let session = Self {
            shared: Arc::new(shared),
        };
        (session, receiver)
    }

    pub fn state(&self) -> SessionState {
        *self.shared.lock_state()
    }

    /// Starts a scan unless one is already running.
    ///
    /// Returns `None` when the session is discovering; nothing is sent to the
    /// backend or the observer in that case.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Option<JoinHandle<ScanOutcome>> {
        {
            let mut state = self.shared.lock_state();
            if *state == SessionState::Discovering {
                warn!("discovery already in progress, ignoring start request");
                return None;
            }
            *state = SessionState::Discovering;
        }

        self.shared.emit(SessionEvent::Busy(true));
        self.shared.emit(SessionEvent::Status(status::STARTING.to_string()));

        let shared = Arc::clone(&self.shared);
        Some(tokio::spawn(run(shared)))
    }
}

async fn run(shared: Arc<Shared>) -> ScanOutcome {
    let guard = ScanGuard::new(Arc::clone(&shared));

    let outcome = shared.scan().await;
    match &outcome {
        Ok(found) => info!(found, "discovery finished"),
        Err(err) => {
            warn!(%err, "discovery failed");
            shared.emit(SessionEvent::Status(err.to_string()));
        }
    }

    shared.stop().await;
    guard.finish();
    outcome
}

impl Shared {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            trace!("no observer attached, dropping session event");
        }
    }

    fn settle(&self) {
        *self.lock_state() = SessionState::Idle;
        self.emit(SessionEvent::Busy(false));
    }

    async fn scan(&self) -> ScanOutcome {
        let service_type = self.settings.service_type.clone();
        info!(
            service_type = service_type.as_deref().unwrap_or("default"),
            "starting discovery"
        );
        self.blocking(move |backend| backend.start_scan(service_type.as_deref()))
            .await?
            .map_err(SessionError::StartFailed)?;

        let window = self.settings.window;
        self.emit(SessionEvent::Status(status::collecting(window)));
        tokio::time::sleep(window).await;

        let timeout = self.settings.collect_timeout;
        let count = self
            .within("collect_count", self.blocking(move |b| b.collect_count(timeout)))
            .await?
            .map_err(SessionError::CollectFailed)?;
        debug!(count, "backend reported entries");

        let devices = self
            .blocking(move |backend| materialize::materialize_all(backend, count))
            .await?;
        let found = devices.len();

        self.emit(SessionEvent::Devices(devices));
        self.emit(SessionEvent::Status(status::found(found)));
        Ok(found)
    }

    /// Waits for any abandoned call to return before stopping. A slow stop is
    /// reported once the call timeout passes but is still waited for.
    async fn stop(&self) {
        let stopping = self.blocking(|backend| backend.stop_scan());
        tokio::pin!(stopping);
        let stopped = match self.settings.call_timeout {
            Some(after) => match tokio::time::timeout(after, &mut stopping).await {
                Ok(stopped) => stopped,
                Err(_) => {
                    warn!(
                        after = %status::human_duration(&after),
                        "backend still busy, waiting for it before stopping"
                    );
                    stopping.await
                }
            },
            None => stopping.await,
        };

        match stopped {
            Ok(Ok(())) => debug!("discovery stopped"),
            Ok(Err(err)) => error!(%err, "backend failed to stop, it may still be scanning"),
            Err(err) => error!(%err, "backend failed to stop, it may still be scanning"),
        }
    }

    async fn blocking<T, F>(&self, call: F) -> Result<T, SessionError>
    where
        F: FnOnce(&dyn DiscoveryBackend) -> T + Send + 'static,
        T: Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let permit = Arc::clone(&self.calls).lock_owned().await;
        let pending = task::spawn_blocking(move || {
            let _permit = permit;
            call(backend.as_ref())
        });
        Ok(pending.await?)
    }

    async fn within<T>(
        &self,
        call: &'static str,
        pending: impl Future<Output = Result<T, SessionError>>,
    ) -> Result<T, SessionError> {
        match self.settings.call_timeout {
            Some(after) => tokio::time::timeout(after, pending)
                .await
                .map_err(|_| SessionError::TimedOut { call, after })?,
            None => pending.await,
        }
    }
}

/// Stops the backend and restores `Idle` if the scan task is dropped before it
/// finishes. The stop runs on the blocking pool once any call still in flight
/// has returned; until then the session stays `Discovering`.
struct ScanGuard {
    shared: Arc<Shared>,
    finished: bool,
}

impl ScanGuard {
    fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            finished: false,
        }
    }

    fn finish(mut self) {
        self.finished = true;
        self.shared.settle();
    }
}

impl Drop for ScanGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("discovery cancelled mid-scan, stopping backend");
        let shared = Arc::clone(&self.shared);
        let cleanup = move || {
            let permit = shared.calls.blocking_lock();
            if let Err(err) = shared.backend.stop_scan() {
                error!(%err, "backend failed to stop, it may still be scanning");
            }
            drop(permit);
            shared.settle();
        };
        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(cleanup);
            }
            Err(_) => cleanup(),
        }
    }
}
