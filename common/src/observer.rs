//! # Session Observer Port
//!
//! Observers see a discovery session through three channels: free-form status
//! text, busy/idle transitions and wholesale device-list replacement.
//!
//! Sessions never call an observer directly. They emit [`SessionEvent`]s that are
//! delivered, in order, on the single context that owns the observer.

use crate::device::DeviceRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Busy(bool),
    Status(String),
    Devices(Vec<DeviceRecord>),
}

pub trait SessionObserver {
    fn on_status(&mut self, status: &str);

    fn on_busy(&mut self, busy: bool);

    /// Replaces any previously reported list.
    fn on_devices(&mut self, devices: &[DeviceRecord]);

    fn notify(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Busy(busy) => self.on_busy(*busy),
            SessionEvent::Status(status) => self.on_status(status),
            SessionEvent::Devices(devices) => self.on_devices(devices),
        }
    }
}
