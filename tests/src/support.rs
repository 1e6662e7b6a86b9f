use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use flock_common::backend::{BackendError, DiscoveryBackend};
use flock_common::config::Config;
use flock_common::device::{DeviceRecord, FieldKind};
use flock_common::observer::{SessionEvent, SessionObserver};
use flock_core::{DiscoverySession, ScanOutcome, SessionModel, SessionState};
use tokio::sync::mpsc::UnboundedReceiver;

/// Shared, ordered log of backend calls and observer notifications.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::default()
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

pub fn config(window: Duration) -> Config {
    Config {
        window,
        collect_timeout: window,
        ..Config::default()
    }
}

/// Runs one scan to completion and delivers everything it emitted.
pub async fn scan(
    session: &DiscoverySession,
    events: &mut UnboundedReceiver<SessionEvent>,
    observer: &mut RecordingObserver,
) -> ScanOutcome {
    let handle = session.start().expect("session should be idle");
    let outcome = handle.await.expect("scan task should not be cancelled");
    flock_core::drain(events, observer);
    outcome
}

/// Waits for a session whose scan task is gone to finish its cleanup.
pub async fn wait_idle(session: &DiscoverySession) {
    let settled = tokio::time::timeout(Duration::from_secs(5), async {
        while session.state() != SessionState::Idle {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    });
    settled.await.expect("session should go idle");
}

/// Reads a native-style result code: negative values are failures.
pub fn result_code(code: i32) -> Result<u32, BackendError> {
    u32::try_from(code).map_err(|_| BackendError::Code(code))
}

type Entry = [Option<String>; 3];

/// A backend whose every answer is set up front.
pub struct ScriptedBackend {
    journal: Journal,
    entries: Vec<Entry>,
    start_code: i32,
    counts: Mutex<VecDeque<i32>>,
    panic_at: Option<usize>,
    start_delay: Duration,
    collect_delay: Duration,
    stop_delay: Duration,
    stop_error: Option<BackendError>,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    scanning: AtomicBool,
    in_flight: AtomicUsize,
    overlapped: AtomicBool,
}

/// Marks one backend call as running for as long as it lives.
struct InFlight<'a>(&'a ScriptedBackend);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedBackend {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: Arc::clone(journal),
            entries: Vec::new(),
            start_code: 0,
            counts: Mutex::new(VecDeque::new()),
            panic_at: None,
            start_delay: Duration::ZERO,
            collect_delay: Duration::ZERO,
            stop_delay: Duration::ZERO,
            stop_error: None,
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            scanning: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            overlapped: AtomicBool::new(false),
        }
    }

    pub fn with_entry(mut self, name: Option<&str>, address: Option<&str>, port: Option<&str>) -> Self {
        self.entries.push([
            name.map(str::to_string),
            address.map(str::to_string),
            port.map(str::to_string),
        ]);
        self
    }

    pub fn with_device(self, name: &str, address: &str, port: &str) -> Self {
        self.with_entry(Some(name), Some(address), Some(port))
    }

    pub fn failing_start(mut self, code: i32) -> Self {
        self.start_code = code;
        self
    }

    /// Queues the raw count returned by the next `collect_count` call. Once the
    /// queue is empty the number of scripted entries is reported.
    pub fn reporting_count(self, code: i32) -> Self {
        self.counts.lock().unwrap().push_back(code);
        self
    }

    pub fn panicking_at(mut self, index: usize) -> Self {
        self.panic_at = Some(index);
        self
    }

    pub fn slow_start(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub fn slow_collect(mut self, delay: Duration) -> Self {
        self.collect_delay = delay;
        self
    }

    pub fn slow_stop(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.stop_error = Some(BackendError::Daemon("socket already closed".into()));
        self
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Whether two backend calls ever ran at the same time.
    pub fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlight<'_> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        InFlight(self)
    }

    fn log(&self, line: String) {
        self.journal.lock().unwrap().push(line);
    }
}

impl DiscoveryBackend for ScriptedBackend {
    fn start_scan(&self, service_type: Option<&str>) -> Result<(), BackendError> {
        let _call = self.enter();
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.log(format!("start_scan({})", service_type.unwrap_or("default")));
        if !self.start_delay.is_zero() {
            thread::sleep(self.start_delay);
        }
        result_code(self.start_code)?;
        self.scanning.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn collect_count(&self, timeout: Duration) -> Result<usize, BackendError> {
        let _call = self.enter();
        self.log(format!("collect_count({}ms)", timeout.as_millis()));
        if !self.collect_delay.is_zero() {
            thread::sleep(self.collect_delay);
        }
        let queued = self.counts.lock().unwrap().pop_front();
        let code = queued.unwrap_or(self.entries.len() as i32);
        result_code(code).map(|count| count as usize)
    }

    fn field(&self, index: usize, kind: FieldKind) -> Option<String> {
        let _call = self.enter();
        if self.panic_at == Some(index) {
            panic!("entry {index} is corrupt");
        }
        let [name, address, port] = self.entries.get(index)?;
        match kind {
            FieldKind::Name => name.clone(),
            FieldKind::Address => address.clone(),
            FieldKind::Port => port.clone(),
        }
    }

    fn stop_scan(&self) -> Result<(), BackendError> {
        let _call = self.enter();
        if !self.stop_delay.is_zero() {
            thread::sleep(self.stop_delay);
        }
        self.scanning.store(false, Ordering::SeqCst);
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.log("stop_scan".to_string());
        match &self.stop_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Writes every notification into a journal and keeps a [`SessionModel`].
pub struct RecordingObserver {
    journal: Journal,
    pub model: SessionModel,
}

impl RecordingObserver {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: Arc::clone(journal),
            model: SessionModel::default(),
        }
    }

    fn log(&self, line: String) {
        self.journal.lock().unwrap().push(line);
    }
}

impl SessionObserver for RecordingObserver {
    fn on_status(&mut self, status: &str) {
        self.log(format!("status({status})"));
        self.model.on_status(status);
    }

    fn on_busy(&mut self, busy: bool) {
        self.log(format!("busy({busy})"));
        self.model.on_busy(busy);
    }

    fn on_devices(&mut self, devices: &[DeviceRecord]) {
        let listed: Vec<String> = devices.iter().map(DeviceRecord::to_string).collect();
        self.log(format!("devices([{}])", listed.join(", ")));
        self.model.on_devices(devices);
    }
}
