use flock_common::device::DeviceRecord;
use flock_common::observer::SessionObserver;
use flock_core::SessionModel;
use tracing::{Span, debug};
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// Mirrors session progress onto the discovery spinner and keeps the latest
/// results for printing once the scan is over.
pub struct TerminalObserver {
    span: Span,
    model: SessionModel,
}

impl TerminalObserver {
    pub fn new(span: Span) -> Self {
        Self {
            span,
            model: SessionModel::default(),
        }
    }

    /// Ends the spinner and hands back the last reported device list.
    pub fn into_devices(self) -> Vec<DeviceRecord> {
        self.model.devices().to_vec()
    }
}

impl SessionObserver for TerminalObserver {
    fn on_status(&mut self, status: &str) {
        debug!(status, "session status");
        self.span.pb_set_message(status);
        self.model.on_status(status);
    }

    fn on_busy(&mut self, busy: bool) {
        debug!(busy, "session busy state changed");
        self.model.on_busy(busy);
    }

    fn on_devices(&mut self, devices: &[DeviceRecord]) {
        self.model.on_devices(devices);
    }
}
