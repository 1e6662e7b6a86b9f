//! Turns index-addressed backend entries into [`DeviceRecord`]s.
//!
//! An entry with any field missing is dropped. Dropping is silent towards the
//! observer; it only shows up as a smaller final count.

use flock_common::backend::DiscoveryBackend;
use flock_common::device::{DeviceRecord, FieldKind};
use tracing::debug;

/// Reads entry `index` from `backend`. Absent or empty fields yield `None`.
pub fn materialize(backend: &dyn DiscoveryBackend, index: usize) -> Option<DeviceRecord> {
    let name = backend.field(index, FieldKind::Name)?;
    let address = backend.field(index, FieldKind::Address)?;
    let port = backend.field(index, FieldKind::Port)?;
    DeviceRecord::new(name, address, port)
}

/// Materializes entries `0..count` in ascending index order.
pub fn materialize_all(backend: &dyn DiscoveryBackend, count: usize) -> Vec<DeviceRecord> {
    (0..count)
        .filter_map(|index| {
            let record = materialize(backend, index);
            if record.is_none() {
                debug!(index, "dropping partially resolved entry");
            }
            record
        })
        .collect()
}
