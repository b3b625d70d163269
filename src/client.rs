use std::future::Future;

use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::auth::{authenticate, Credential};
use crate::commands::{RoomCommand, MAX_PLAYLIST_VIDEOS};
use crate::connection::RoomConnection;
use crate::models::{PlaylistSnapshot, VideoEntry};
use crate::poller::wait_until;
use crate::settings::Settings;
use crate::tracker::PlaylistTracker;
use crate::utils::{classify_youtube_url, parse_room_id, shuffle, VideoReference};
use crate::youtube::PlaylistSource;
use crate::SyncTubeError;

/// Drives commands against a single SyncTube room.
///
/// Every command opens its own [`RoomConnection`] and closes it again before
/// returning, whether it succeeded or not. The session credential is fetched
/// once and reused for the rest of the run.
pub struct SyncTubeClient {
    http: Client,
    room_id: String,
    settings: Settings,
    credential: RwLock<Option<Credential>>,
}

impl SyncTubeClient {
    /// `room` is either a bare room id or a full room URL.
    pub fn new(room: &str, settings: Settings) -> Result<Self, SyncTubeError> {
        let room_id = parse_room_id(room)?;
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            http,
            room_id,
            settings,
            credential: RwLock::new(None),
        })
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The HTTP client used for the auth challenge, shareable with other
    /// collaborators such as [`crate::YoutubeApi`].
    pub fn http_client(&self) -> &Client {
        &self.http
    }

    /// Session credential for this run, authenticating on first use.
    pub async fn session_credential(&self) -> Result<Credential, SyncTubeError> {
        if let Some(credential) = self.credential.read().await.clone() {
            return Ok(credential);
        }
        let credential = authenticate(&self.http, &self.settings.synctube_base_url).await?;
        *self.credential.write().await = Some(credential.clone());
        Ok(credential)
    }

    /// Connect to the room and wait for it to open.
    ///
    /// When a tracker is given it is registered before the handshake starts
    /// so no snapshot push is missed. Announces the configured bot name once
    /// open. The connection is closed again if any of this fails.
    pub async fn open_room(
        &self,
        tracker: Option<&PlaylistTracker>,
    ) -> Result<RoomConnection, SyncTubeError> {
        let credential = self.session_credential().await?;
        let handlers = tracker.map(PlaylistTracker::handler).into_iter().collect();
        let connection = RoomConnection::connect_with_handlers(
            &self.settings.synctube_ws_url,
            &self.room_id,
            &credential,
            handlers,
        )?;

        let opened: Result<(), SyncTubeError> = async {
            connection
                .wait_until_open(self.settings.open_timeout)
                .await?;
            if let Some(name) = &self.settings.bot_name {
                connection
                    .send(&RoomCommand::SetName { name: name.clone() })
                    .await?;
            }
            Ok(())
        }
        .await;

        match opened {
            Ok(()) => Ok(connection),
            Err(e) => {
                close_quietly(&connection).await;
                Err(e)
            }
        }
    }

    /// Queue a single video or up to 50 videos of a playlist.
    ///
    /// Playlist videos are resolved through `source` before the room is
    /// opened and are optionally shuffled. Returns how many videos were sent.
    pub async fn queue(
        &self,
        source: &dyn PlaylistSource,
        url: &str,
        random: bool,
    ) -> Result<usize, SyncTubeError> {
        let commands = match classify_youtube_url(url)? {
            VideoReference::Video(src) => {
                debug!(%src, "Queueing single video");
                vec![RoomCommand::QueueVideo { src }]
            }
            VideoReference::Playlist(playlist_id) => {
                let mut video_ids = source.playlist_video_ids(playlist_id.clone()).await?;
                if video_ids.len() > MAX_PLAYLIST_VIDEOS {
                    warn!(
                        found = video_ids.len(),
                        "Playlist is longer than {}, truncating",
                        MAX_PLAYLIST_VIDEOS
                    );
                    video_ids.truncate(MAX_PLAYLIST_VIDEOS);
                }
                if random {
                    shuffle(&mut video_ids, &mut rand::rng());
                }
                RoomCommand::queue_all(&video_ids)
            }
        };

        if commands.is_empty() {
            warn!(url, "Playlist has no videos, nothing to queue");
            return Ok(0);
        }

        let connection = self.open_room(None).await?;
        info!(
            videos = commands.len(),
            "Queueing videos, should take about {:?}",
            self.settings.pacing_interval * (commands.len() as u32 - 1)
        );
        let result = connection
            .send_paced(commands, self.settings.pacing_interval)
            .await;
        close_quietly(&connection).await;
        result
    }

    /// Remove every video currently in the room's playlist. Returns how many
    /// remove messages were sent.
    pub async fn clear(&self) -> Result<usize, SyncTubeError> {
        let tracker = PlaylistTracker::new();
        let connection = self.open_room(Some(&tracker)).await?;

        let result: Result<usize, SyncTubeError> = async {
            let snapshot = self.await_snapshot(&tracker).await;
            let commands = RoomCommand::clear_all(&snapshot)?;
            info!(videos = commands.len(), "Clearing room playlist");
            connection
                .send_paced(commands, self.settings.pacing_interval)
                .await
        }
        .await;

        close_quietly(&connection).await;
        result
    }

    /// Move one video to the top of the room's playlist.
    ///
    /// `choose` is given the current snapshot and resolves to the 1-based
    /// position of the video to move. It is awaited, so an operator prompt
    /// must not block the runtime while it waits for input. Returns the moved
    /// video.
    pub async fn move_to_top<F, Fut>(&self, choose: F) -> Result<VideoEntry, SyncTubeError>
    where
        F: FnOnce(PlaylistSnapshot) -> Fut,
        Fut: Future<Output = Result<i64, SyncTubeError>>,
    {
        let tracker = PlaylistTracker::new();
        let connection = self.open_room(Some(&tracker)).await?;

        let result: Result<VideoEntry, SyncTubeError> = async {
            let snapshot = self.await_snapshot(&tracker).await;
            if snapshot.is_empty() {
                return Err(SyncTubeError::EmptyPlaylist);
            }
            let selection = choose(snapshot.clone()).await?;
            let (video, commands) = RoomCommand::move_to_top(&snapshot, selection)?;
            info!(
                id = %video.id,
                title = %video.title,
                steps = commands.len(),
                "Moving video to the top"
            );
            connection
                .send_paced(commands, self.settings.pacing_interval)
                .await?;
            Ok(video)
        }
        .await;

        close_quietly(&connection).await;
        result
    }

    /// Wait (bounded) for the first snapshot push, then return the tracker's
    /// view. An empty snapshot comes back if nothing arrived in time.
    async fn await_snapshot(&self, tracker: &PlaylistTracker) -> PlaylistSnapshot {
        if let Err(e) = wait_until(|| tracker.has_snapshot(), self.settings.snapshot_timeout).await
        {
            warn!(error = %e, "No playlist snapshot received from the room");
        }
        tracker.current_snapshot()
    }
}

async fn close_quietly(connection: &RoomConnection) {
    if let Err(e) = connection.close().await {
        warn!(error = %e, "Error while closing room connection (ignored)");
    }
}

impl std::fmt::Debug for SyncTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncTubeClient")
            .field("room_id", &self.room_id)
            .finish()
    }
}
