//! # Flock Core
//!
//! Orchestrates bounded discovery scans on top of a
//! [`DiscoveryBackend`](flock_common::backend::DiscoveryBackend).
//!
//! A [`DiscoverySession`] owns one scan at a time: it starts the backend, waits out
//! the collection window, turns index-addressed backend entries into
//! [`DeviceRecord`](flock_common::device::DeviceRecord)s and always stops the
//! backend before going idle again. Progress leaves the session as
//! [`SessionEvent`](flock_common::observer::SessionEvent)s, which [`dispatch`]
//! hands to an observer on the caller's context.

pub mod dispatch;
pub mod materialize;
pub mod model;
pub mod session;
mod status;

pub use dispatch::{dispatch, drain};
pub use model::SessionModel;
pub use session::{DiscoverySession, ScanOutcome, SessionError, SessionState};
