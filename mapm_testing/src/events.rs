//! Capture events delivered to manager callbacks.

use std::{sync::Arc, time::Duration};

use mapm::{EventCallback, MapEvent};
use tokio::sync::mpsc;

/// Receiving side of a callback built by [`recorder`].
#[derive(Debug)]
pub struct EventRecorder {
    rx: mpsc::UnboundedReceiver<MapEvent>,
}

/// Build a callback that forwards every event it sees to an
/// [`EventRecorder`].
pub fn recorder() -> (EventCallback, EventRecorder) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback: EventCallback = Arc::new(move |event: &MapEvent| {
        let _ = tx.send(event.clone());
    });
    (callback, EventRecorder { rx })
}

impl EventRecorder {
    /// Wait up to `limit` for the next event.
    pub async fn next_within(&mut self, limit: Duration) -> Option<MapEvent> {
        tokio::time::timeout(limit, self.rx.recv()).await.ok().flatten()
    }

    /// Wait up to one second for the next event.
    pub async fn next(&mut self) -> Option<MapEvent> { self.next_within(Duration::from_secs(1)).await }

    /// Return an already delivered event without waiting.
    pub fn try_next(&mut self) -> Option<MapEvent> { self.rx.try_recv().ok() }
}
