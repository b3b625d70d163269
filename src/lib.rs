//! Client for SyncTube rooms.
//!
//! Authenticates a session, opens the room websocket, mirrors the room's
//! playlist from snapshot pushes and drives paced command sequences against
//! it: queueing YouTube videos or playlists, clearing the playlist and moving
//! a video to the top.
//!
//! # Logging
//!
//! This library uses the `tracing` crate for logging. To enable logs, you'll need to
//! initialize a tracing subscriber in your application.
//!
//! Example using `tracing_subscriber`:
//! ```no_run
//! use tracing::Level;
//! use tracing_subscriber::FmtSubscriber;
//!
//! // Create a subscriber with the desired log level
//! let subscriber = FmtSubscriber::builder()
//!     .with_max_level(Level::DEBUG) // Set to DEBUG, INFO, WARN, or ERROR
//!     .finish();
//!
//! // Initialize the global subscriber
//! tracing::subscriber::set_global_default(subscriber)
//!     .expect("Failed to set tracing subscriber");
//! ```
//!
//! The log levels control what information is displayed:
//! - `TRACE`: Every inbound frame and connection state change
//! - `DEBUG`: Outbound messages, handshake details, ignored frames
//! - `INFO`: Connections opened/closed and command progress
//! - `WARN`: Timeouts and non-fatal failures
//! - `ERROR`: Failed handshakes and upstream errors

mod auth;
pub use auth::{authenticate, Credential};
mod client;
pub use client::SyncTubeClient;
pub mod codec;
mod commands;
pub use commands::{
    RoomCommand, MAX_PLAYLIST_VIDEOS, MOVE_VIDEO_CODE, QUEUE_VIDEO_CODE, REMOVE_VIDEO_CODE,
    SET_NAME_CODE,
};
mod connection;
pub use connection::{room_url, MessageHandler, RoomConnection, CLIENT_IDENTITY};
mod error;
pub use error::SyncTubeError;
mod events;
pub use events::{RoomEvent, SNAPSHOT_CODE};
mod models;
pub use models::{
    ContentDetails, PlaylistItem, PlaylistItemsResponse, PlaylistSnapshot, RoomPlaylist,
    RoomState, VideoEntry,
};
pub mod poller;
mod settings;
pub use settings::{Settings, SETTINGS};
mod state;
pub use state::ConnectionState;
mod tracker;
pub use tracker::PlaylistTracker;
pub mod utils;
mod youtube;
pub use youtube::{PlaylistSource, YoutubeApi};
