//! Concrete [`DiscoveryBackend`](flock_common::backend::DiscoveryBackend) adapters.
//!
//! * [`MdnsBackend`]: browses the local network over mDNS/DNS-SD.
//! * [`SimulatedBackend`]: serves a fixed set of entries from memory.

pub mod mdns;
pub mod simulator;

pub use mdns::MdnsBackend;
pub use simulator::{SimulatedBackend, SimulatedEntry};
