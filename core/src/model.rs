use flock_common::device::DeviceRecord;
use flock_common::observer::SessionObserver;

pub const INITIAL_STATUS: &str = "ready to discover devices";

/// Observer-side view of a session: latest status text, busy flag and the last
/// reported device list.
///
/// The list is only ever replaced wholesale, so a failed scan leaves the previous
/// results in place.
#[derive(Debug, Clone)]
pub struct SessionModel {
    status: String,
    busy: bool,
    devices: Vec<DeviceRecord>,
}

impl Default for SessionModel {
    fn default() -> Self {
        Self {
            status: INITIAL_STATUS.to_string(),
            busy: false,
            devices: Vec::new(),
        }
    }
}

impl SessionModel {
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn devices(&self) -> &[DeviceRecord] {
        &self.devices
    }
}

impl SessionObserver for SessionModel {
    fn on_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    fn on_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    fn on_devices(&mut self, devices: &[DeviceRecord]) {
        self.devices = devices.to_vec();
    }
}
