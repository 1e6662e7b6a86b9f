//! # Discovery Backend Port
//!
//! The contract between a discovery session and whatever actually talks to the
//! network. Backends are index addressed: after a scan has run, the session asks
//! how many entries exist and then reads each entry field by field.
//!
//! Every method is synchronous and may block. Callers are expected to issue them
//! from a worker context.

use std::time::Duration;

use thiserror::Error;

use crate::device::FieldKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// A native-style binding reported a negative result code.
    #[error("error code {0}")]
    Code(i32),
    #[error("no scan in progress")]
    NotScanning,
    #[error("invalid service type '{0}'")]
    InvalidServiceType(String),
    #[error("mdns daemon: {0}")]
    Daemon(String),
}

pub trait DiscoveryBackend: Send + Sync {
    /// Begins scanning for `service_type`, or for the standard DNS-SD browse type
    /// when `None`.
    fn start_scan(&self, service_type: Option<&str>) -> Result<(), BackendError>;

    /// Returns how many entries the running scan has produced.
    fn collect_count(&self, timeout: Duration) -> Result<usize, BackendError>;

    /// Reads one field of entry `index`. `None` means the field is not available.
    fn field(&self, index: usize, kind: FieldKind) -> Option<String>;

    /// Ends the scan. Must be safe to call when no scan was started or when the
    /// scan was already stopped.
    fn stop_scan(&self) -> Result<(), BackendError>;
}
