use tracing::{debug, trace};

use crate::codec::decode_frame;
use crate::models::{PlaylistSnapshot, RoomState};

/// Inbound code of the full room state push.
pub const SNAPSHOT_CODE: u16 = 0;

// Events decoded from inbound room frames
#[derive(Debug, Clone)]
pub enum RoomEvent {
    PlaylistSnapshot(PlaylistSnapshot),
    /// Any message the client has no use for, kept with its code for logging
    Other { code: u16 },
}

impl RoomEvent {
    /// Decode an inbound text frame.
    ///
    /// Frames that do not parse, or snapshot pushes whose body does not have
    /// the expected `{playlist: {list: [...]}}` shape, yield `None`.
    pub fn decode(frame: &str) -> Option<RoomEvent> {
        let Some(parsed) = decode_frame(frame) else {
            trace!(frame, "Ignoring unrecognised frame");
            return None;
        };

        if parsed.code != SNAPSHOT_CODE {
            return Some(RoomEvent::Other { code: parsed.code });
        }

        match serde_json::from_str::<RoomState>(parsed.body) {
            Ok(state) => Some(RoomEvent::PlaylistSnapshot(PlaylistSnapshot::new(
                state.playlist.list,
            ))),
            Err(e) => {
                debug!(error = %e, "Ignoring snapshot push with unexpected shape");
                None
            }
        }
    }

    // Get the name of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            RoomEvent::PlaylistSnapshot(_) => "playlistSnapshot",
            RoomEvent::Other { .. } => "other",
        }
    }
}
