use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};

use crate::commands::MAX_PLAYLIST_VIDEOS;
use crate::models::PlaylistItemsResponse;
use crate::SyncTubeError;

/// Anything that can turn a YouTube playlist id into its video ids.
pub trait PlaylistSource: Send + Sync {
    fn playlist_video_ids(
        &self,
        playlist_id: String,
    ) -> BoxFuture<'static, Result<Vec<String>, SyncTubeError>>;
}

/// YouTube Data API v3 client for the `playlistItems` endpoint.
///
/// Only the first page (up to 50 items) is fetched.
#[derive(Clone)]
pub struct YoutubeApi {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YoutubeApi {
    pub fn new(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn fetch_first_page(
        client: Client,
        url: String,
        api_key: String,
        playlist_id: String,
    ) -> Result<Vec<String>, SyncTubeError> {
        let max_results = MAX_PLAYLIST_VIDEOS.to_string();
        let params = [
            ("part", "contentDetails"),
            ("playlistId", playlist_id.as_str()),
            ("maxResults", max_results.as_str()),
            ("key", api_key.as_str()),
        ];

        debug!(%playlist_id, "Requesting playlist items");
        let response = client
            .get(&url)
            .query(&params)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SyncTubeError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body_text = response.text().await.unwrap_or_default();
            error!(%status, body = %body_text, "YouTube API request failed");
            return Err(SyncTubeError::Upstream(format!(
                "failed to list playlistId={} (HTTP {})",
                playlist_id, status
            )));
        }

        let page = response
            .json::<PlaylistItemsResponse>()
            .await
            .map_err(|e| SyncTubeError::Upstream(format!("malformed playlistItems body: {}", e)))?;

        if page.next_page_token.is_some() {
            debug!("Playlist has more pages, only the first is used");
        }

        let ids: Vec<String> = page
            .items
            .into_iter()
            .map(|item| item.content_details.video_id)
            .collect();
        info!(%playlist_id, videos = ids.len(), "Resolved playlist");
        Ok(ids)
    }
}

impl PlaylistSource for YoutubeApi {
    fn playlist_video_ids(
        &self,
        playlist_id: String,
    ) -> BoxFuture<'static, Result<Vec<String>, SyncTubeError>> {
        let url = format!("{}/playlistItems", self.base_url);
        Self::fetch_first_page(self.client.clone(), url, self.api_key.clone(), playlist_id).boxed()
    }
}

impl std::fmt::Debug for YoutubeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubeApi")
            .field("base_url", &self.base_url)
            .finish()
    }
}
