use std::time::Duration;

use thiserror::Error;

use crate::state::ConnectionState;

// Basic error handling with thiserror
#[derive(Error, Debug)]
pub enum SyncTubeError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseFailed(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task panicked or cancelled")]
    TaskJoinError(#[from] tokio::task::JoinError),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Room {room_id} did not open within {timeout:?}")]
    ConnectTimeout { room_id: String, timeout: Duration },

    #[error("Failed to connect to room {room_id}: {reason}")]
    ConnectFailed { room_id: String, reason: String },

    #[error("Not connected (connection is {0})")]
    NotConnected(ConnectionState),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("YouTube API error: {0}")]
    Upstream(String),

    #[error("The room playlist is empty")]
    EmptyPlaylist,

    #[error("Invalid selection {selection}, expected a number between 1 and {len}")]
    InvalidSelection { selection: i64, len: usize },

    #[error("Nothing to do: {0}")]
    NoOp(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported YouTube link: {0}")]
    UnsupportedUrl(String),

    #[error("Playlist URL has no 'list' parameter: {0}")]
    MissingPlaylistId(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncTubeError {
    /// True when the error was caused by the operator's input rather than by
    /// the room or an upstream service.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SyncTubeError::InvalidSelection { .. }
                | SyncTubeError::NoOp(_)
                | SyncTubeError::InvalidUrl(_)
                | SyncTubeError::UnsupportedUrl(_)
                | SyncTubeError::MissingPlaylistId(_)
                | SyncTubeError::Config(_)
        )
    }
}
