use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, PoisonError, RwLock,
};

use tracing::{debug, trace};

use crate::connection::MessageHandler;
use crate::events::RoomEvent;
use crate::models::PlaylistSnapshot;

/// Mirrors the room's playlist from snapshot pushes.
///
/// Every snapshot replaces the previous one wholesale; nothing is merged.
/// Cloning yields another handle onto the same state.
#[derive(Clone, Default)]
pub struct PlaylistTracker {
    snapshot: Arc<RwLock<PlaylistSnapshot>>,
    pushes: Arc<AtomicU64>,
}

impl PlaylistTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A message handler feeding this tracker, for
    /// [`crate::RoomConnection::connect_with_handlers`].
    pub fn handler(&self) -> MessageHandler {
        let tracker = self.clone();
        Box::new(move |frame| {
            tracker.handle_frame(frame);
        })
    }

    /// Feed one inbound frame. Returns true if it replaced the snapshot.
    pub fn handle_frame(&self, frame: &str) -> bool {
        match RoomEvent::decode(frame) {
            Some(RoomEvent::PlaylistSnapshot(snapshot)) => {
                debug!(videos = snapshot.len(), "Received playlist snapshot");
                let mut current = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
                *current = snapshot;
                self.pushes.fetch_add(1, Ordering::SeqCst);
                true
            }
            Some(event) => {
                trace!(event = event.event_type(), "Ignoring room event");
                false
            }
            None => false,
        }
    }

    /// The most recent snapshot, empty before the first push.
    pub fn current_snapshot(&self) -> PlaylistSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot_count() > 0
    }

    /// How many snapshot pushes have been applied so far.
    pub fn snapshot_count(&self) -> u64 {
        self.pushes.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for PlaylistTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistTracker")
            .field("snapshot_count", &self.snapshot_count())
            .finish()
    }
}
