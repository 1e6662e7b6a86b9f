//! Delivery of session events onto the observer's context.
//!
//! Sessions push [`SessionEvent`]s from their worker; whoever owns the observer
//! pulls them here, so observer state is only ever touched from one place.

use flock_common::observer::{SessionEvent, SessionObserver};
use tokio::sync::mpsc::UnboundedReceiver;

/// Forwards events to `observer` until every sending session is gone.
pub async fn dispatch<O>(mut events: UnboundedReceiver<SessionEvent>, observer: &mut O)
where
    O: SessionObserver + ?Sized,
{
    while let Some(event) = events.recv().await {
        observer.notify(&event);
    }
}

/// Forwards whatever is queued right now without waiting. Returns how many events
/// were delivered.
pub fn drain<O>(events: &mut UnboundedReceiver<SessionEvent>, observer: &mut O) -> usize
where
    O: SessionObserver + ?Sized,
{
    let mut delivered = 0;
    while let Ok(event) = events.try_recv() {
        observer.notify(&event);
        delivered += 1;
    }
    delivered
}
