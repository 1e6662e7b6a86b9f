//! # mDNS Backend
//!
//! Browses DNS-SD service types through an [`mdns_sd::ServiceDaemon`] and exposes
//! the resolved instances by index.
//!
//! Browsing the meta query (`_services._dns-sd._udp.local.`) only yields service
//! *types*, so every type announced that way is browsed in turn. Resolved
//! instances accumulate on listener threads until the session reads them back.

use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use flock_common::backend::{BackendError, DiscoveryBackend};
use flock_common::config::DEFAULT_SERVICE_TYPE;
use flock_common::device::FieldKind;
use mdns_sd::{Receiver, ServiceDaemon, ServiceEvent, ServiceInfo};
use tracing::{debug, error, trace};

/// How long the resolved list must stay unchanged before a count is taken.
const SETTLE: Duration = Duration::from_millis(250);
const POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolved {
    fullname: String,
    name: Option<String>,
    address: Option<IpAddr>,
    port: u16,
}

impl Resolved {
    fn from_info(info: &ServiceInfo) -> Self {
        let addresses: Vec<IpAddr> = info.get_addresses().iter().copied().collect();
        Self {
            fullname: info.get_fullname().to_string(),
            name: instance_name(info.get_fullname(), info.get_type()),
            address: preferred_address(&addresses),
            port: info.get_port(),
        }
    }

    fn field(&self, kind: FieldKind) -> Option<String> {
        match kind {
            FieldKind::Name => self.name.clone(),
            FieldKind::Address => self.address.map(|ip| ip.to_string()),
            FieldKind::Port => (self.port != 0).then(|| self.port.to_string()),
        }
    }
}

/// `Printer._ipp._tcp.local.` browsed as `_ipp._tcp.local.` is named `Printer`.
fn instance_name(fullname: &str, service_type: &str) -> Option<String> {
    let name = fullname
        .strip_suffix(service_type)
        .unwrap_or(fullname)
        .trim_end_matches('.');
    (!name.is_empty()).then(|| name.to_string())
}

fn preferred_address(addresses: &[IpAddr]) -> Option<IpAddr> {
    addresses
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addresses.first())
        .copied()
}

fn validate_service_type(service_type: &str) -> Result<(), BackendError> {
    if service_type.ends_with(".local.") {
        Ok(())
    } else {
        Err(BackendError::InvalidServiceType(service_type.to_string()))
    }
}

fn daemon_error(err: mdns_sd::Error) -> BackendError {
    BackendError::Daemon(err.to_string())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn record(found: &Mutex<Vec<Resolved>>, service: Resolved) {
    let mut found = lock(found);
    match found.iter_mut().find(|known| known.fullname == service.fullname) {
        Some(known) => *known = service,
        None => {
            debug!(service = %service.fullname, "resolved service");
            found.push(service);
        }
    }
}

/// State of a running scan, shared with its listener threads.
#[derive(Clone)]
struct Browse {
    daemon: ServiceDaemon,
    types: Arc<Mutex<Vec<String>>>,
    found: Arc<Mutex<Vec<Resolved>>>,
}

impl Browse {
    fn begin(service_type: &str) -> Result<Self, BackendError> {
        let browse = Self {
            daemon: ServiceDaemon::new().map_err(daemon_error)?,
            types: Arc::default(),
            found: Arc::default(),
        };
        if let Err(err) = browse.browse(service_type) {
            if let Err(shutdown_err) = browse.end() {
                debug!(%shutdown_err, "failed to shut down daemon after browse error");
            }
            return Err(err);
        }
        Ok(browse)
    }

    fn browse(&self, service_type: &str) -> Result<(), BackendError> {
        validate_service_type(service_type)?;
        let mut types = lock(&self.types);
        if types.iter().any(|known| known == service_type) {
            return Ok(());
        }

        let receiver = self.daemon.browse(service_type).map_err(daemon_error)?;
        types.push(service_type.to_string());
        drop(types);

        let listener = self.clone();
        let is_meta = service_type == DEFAULT_SERVICE_TYPE;
        thread::Builder::new()
            .name(format!("mdns-{service_type}"))
            .spawn(move || listener.listen(receiver, is_meta))
            .map(|_| ())
            .map_err(|err| BackendError::Daemon(err.to_string()))
    }

    fn listen(self, receiver: Receiver<ServiceEvent>, is_meta: bool) {
        while let Ok(event) = receiver.recv() {
            match event {
                ServiceEvent::ServiceResolved(info) => {
                    record(&self.found, Resolved::from_info(&info));
                }
                ServiceEvent::ServiceFound(_, service_type) if is_meta => {
                    if let Err(err) = self.browse(&service_type) {
                        debug!(%service_type, %err, "skipping announced service type");
                    }
                }
                ServiceEvent::SearchStopped(service_type) => {
                    trace!(%service_type, "browse stopped");
                    break;
                }
                _ => {}
            }
        }
    }

    fn end(&self) -> Result<(), BackendError> {
        for service_type in lock(&self.types).drain(..) {
            if let Err(err) = self.daemon.stop_browse(&service_type) {
                debug!(%service_type, %err, "failed to stop browsing");
            }
        }
        self.daemon.shutdown().map(|_| ()).map_err(daemon_error)
    }
}

/// A [`DiscoveryBackend`] over the system's multicast DNS.
///
/// One scan at a time; starting a new scan ends the previous one.
#[derive(Default)]
pub struct MdnsBackend {
    active: Mutex<Option<Browse>>,
    snapshot: Mutex<Vec<Resolved>>,
}

impl MdnsBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiscoveryBackend for MdnsBackend {
    fn start_scan(&self, service_type: Option<&str>) -> Result<(), BackendError> {
        let service_type = service_type.unwrap_or(DEFAULT_SERVICE_TYPE);
        validate_service_type(service_type)?;

        let mut active = lock(&self.active);
        if let Some(previous) = active.take() {
            debug!("replacing running browse");
            previous.end()?;
        }
        lock(&self.snapshot).clear();

        *active = Some(Browse::begin(service_type)?);
        debug!(service_type, "browsing");
        Ok(())
    }

    fn collect_count(&self, timeout: Duration) -> Result<usize, BackendError> {
        let found = match lock(&self.active).as_ref() {
            Some(browse) => Arc::clone(&browse.found),
            None => return Err(BackendError::NotScanning),
        };

        let deadline = Instant::now() + timeout;
        let mut last_len = lock(&found).len();
        let mut stable_since = Instant::now();

        loop {
            let now = Instant::now();
            if now >= deadline || now.duration_since(stable_since) >= SETTLE {
                break;
            }
            thread::sleep(POLL.min(deadline - now));

            let len = lock(&found).len();
            if len != last_len {
                last_len = len;
                stable_since = Instant::now();
            }
        }

        let snapshot = lock(&found).clone();
        let count = snapshot.len();
        *lock(&self.snapshot) = snapshot;
        Ok(count)
    }

    fn field(&self, index: usize, kind: FieldKind) -> Option<String> {
        lock(&self.snapshot).get(index)?.field(kind)
    }

    fn stop_scan(&self) -> Result<(), BackendError> {
        match lock(&self.active).take() {
            Some(browse) => browse.end(),
            None => Ok(()),
        }
    }
}

impl Drop for MdnsBackend {
    fn drop(&mut self) {
        if let Err(err) = self.stop_scan() {
            error!(%err, "failed to shut down mdns daemon");
        }
    }
}
