//! # Discovered Device Model
//!
//! A [`DeviceRecord`] is the fully resolved form of one backend entry. Partially
//! resolved entries never become records, so every record carries a name, an
//! address and a port.

use std::fmt;

/// The per-entry fields a [`crate::backend::DiscoveryBackend`] can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Name,
    Address,
    Port,
}

impl FieldKind {
    pub const ALL: [FieldKind; 3] = [FieldKind::Name, FieldKind::Address, FieldKind::Port];
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldKind::Name => "name",
            FieldKind::Address => "address",
            FieldKind::Port => "port",
        };
        f.write_str(label)
    }
}

/// One discovered endpoint, identified by its `(name, address, port)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceRecord {
    name: String,
    address: String,
    port: String,
}

impl DeviceRecord {
    /// Builds a record, or `None` when any of the three fields is empty.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        port: impl Into<String>,
    ) -> Option<Self> {
        let (name, address, port) = (name.into(), address.into(), port.into());
        if name.is_empty() || address.is_empty() || port.is_empty() {
            return None;
        }
        Some(Self {
            name,
            address,
            port,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.name, self.address, self.port)
    }
}
