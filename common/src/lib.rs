//! # Flock Common
//!
//! Shared vocabulary of the discovery workspace.
//!
//! * **[`device`]**: the [`device::DeviceRecord`] value type and the field kinds a backend exposes.
//! * **[`backend`]**: the [`backend::DiscoveryBackend`] port every scanner adapter implements.
//! * **[`observer`]**: the [`observer::SessionObserver`] port and the events that feed it.
//! * **[`config`]**: user-facing knobs for a discovery session.
//!
//! Nothing in here performs I/O.

pub mod backend;
pub mod config;
pub mod device;
pub mod observer;
