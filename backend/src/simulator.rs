//! In-memory backend for running without a network.
//!
//! Entries are fixed at construction. Fields can be left out individually to
//! mimic services the network never fully resolved.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use flock_common::backend::{BackendError, DiscoveryBackend};
use flock_common::device::FieldKind;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulatedEntry {
    pub name: Option<String>,
    pub address: Option<String>,
    pub port: Option<String>,
}

impl SimulatedEntry {
    pub fn resolved(name: &str, address: &str, port: u16) -> Self {
        Self {
            name: Some(name.to_string()),
            address: Some(address.to_string()),
            port: Some(port.to_string()),
        }
    }

    pub fn without_address(mut self) -> Self {
        self.address = None;
        self
    }

    fn field(&self, kind: FieldKind) -> Option<String> {
        match kind {
            FieldKind::Name => self.name.clone(),
            FieldKind::Address => self.address.clone(),
            FieldKind::Port => self.port.clone(),
        }
    }
}

pub struct SimulatedBackend {
    entries: Vec<SimulatedEntry>,
    scanning: AtomicBool,
}

impl SimulatedBackend {
    pub fn new(entries: Vec<SimulatedEntry>) -> Self {
        Self {
            entries,
            scanning: AtomicBool::new(false),
        }
    }

    /// A small home network, including one service that never resolved an
    /// address.
    pub fn demo() -> Self {
        Self::new(vec![
            SimulatedEntry::resolved("Printer", "192.168.1.5", 631),
            SimulatedEntry::resolved("NAS", "192.168.1.9", 445),
            SimulatedEntry::resolved("Living Room TV", "192.168.1.23", 8009).without_address(),
            SimulatedEntry::resolved("Office Speaker", "fe80::1c2b:3aff:fe4e:5f60", 7000),
        ])
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }
}

impl DiscoveryBackend for SimulatedBackend {
    fn start_scan(&self, service_type: Option<&str>) -> Result<(), BackendError> {
        debug!(service_type, "simulated scan started");
        self.scanning.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn collect_count(&self, _timeout: Duration) -> Result<usize, BackendError> {
        if !self.is_scanning() {
            return Err(BackendError::NotScanning);
        }
        Ok(self.entries.len())
    }

    fn field(&self, index: usize, kind: FieldKind) -> Option<String> {
        self.entries.get(index)?.field(kind)
    }

    fn stop_scan(&self) -> Result<(), BackendError> {
        self.scanning.store(false, Ordering::SeqCst);
        Ok(())
    }
}
