use crate::models::{PlaylistSnapshot, VideoEntry};
use crate::utils::watch_url;
use crate::SyncTubeError;

/// Type codes of the messages the client sends to a room.
pub const SET_NAME_CODE: u16 = 12;
pub const QUEUE_VIDEO_CODE: u16 = 30;
pub const REMOVE_VIDEO_CODE: u16 = 31;
pub const MOVE_VIDEO_CODE: u16 = 32;

/// Most videos queued from one playlist; longer lists are truncated.
pub const MAX_PLAYLIST_VIDEOS: usize = 50;

// Room commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomCommand {
    SetName { name: String },
    QueueVideo { src: String },
    RemoveVideo { id: String },
    /// Moves the video one position toward the top of the playlist
    MoveVideoUp { id: String },
}

impl RoomCommand {
    pub fn code(&self) -> u16 {
        match self {
            RoomCommand::SetName { .. } => SET_NAME_CODE,
            RoomCommand::QueueVideo { .. } => QUEUE_VIDEO_CODE,
            RoomCommand::RemoveVideo { .. } => REMOVE_VIDEO_CODE,
            RoomCommand::MoveVideoUp { .. } => MOVE_VIDEO_CODE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoomCommand::SetName { .. } => "setName",
            RoomCommand::QueueVideo { .. } => "queueVideo",
            RoomCommand::RemoveVideo { .. } => "removeVideo",
            RoomCommand::MoveVideoUp { .. } => "moveVideo",
        }
    }

    /// Queue and name messages carry a client timestamp, remove and move do not.
    pub fn is_timestamped(&self) -> bool {
        matches!(
            self,
            RoomCommand::SetName { .. } | RoomCommand::QueueVideo { .. }
        )
    }

    pub fn queue_video_id(video_id: &str) -> Self {
        RoomCommand::QueueVideo {
            src: watch_url(video_id),
        }
    }

    /// One queue message per video id, capped at [`MAX_PLAYLIST_VIDEOS`].
    pub fn queue_all<S: AsRef<str>>(video_ids: &[S]) -> Vec<RoomCommand> {
        video_ids
            .iter()
            .take(MAX_PLAYLIST_VIDEOS)
            .map(|id| RoomCommand::queue_video_id(id.as_ref()))
            .collect()
    }

    /// One remove message per entry of the snapshot.
    pub fn clear_all(snapshot: &PlaylistSnapshot) -> Result<Vec<RoomCommand>, SyncTubeError> {
        if snapshot.is_empty() {
            return Err(SyncTubeError::EmptyPlaylist);
        }
        Ok(snapshot
            .iter()
            .map(|video| RoomCommand::RemoveVideo {
                id: video.id.clone(),
            })
            .collect())
    }

    /// The room only knows how to move a video one step up, so bringing the
    /// 1-based `selection` to the top takes `selection - 1` identical moves.
    pub fn move_to_top(
        snapshot: &PlaylistSnapshot,
        selection: i64,
    ) -> Result<(VideoEntry, Vec<RoomCommand>), SyncTubeError> {
        if snapshot.is_empty() {
            return Err(SyncTubeError::EmptyPlaylist);
        }
        let len = snapshot.len();
        if selection <= 0 || selection as u64 > len as u64 {
            return Err(SyncTubeError::InvalidSelection { selection, len });
        }
        let index = (selection - 1) as usize;
        let video = snapshot.videos[index].clone();
        if index == 0 {
            return Err(SyncTubeError::NoOp(format!(
                "'{}' is already at the top of the playlist",
                video.title
            )));
        }
        let commands = (0..index)
            .map(|_| RoomCommand::MoveVideoUp {
                id: video.id.clone(),
            })
            .collect();
        Ok((video, commands))
    }
}
