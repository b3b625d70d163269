use serde::Deserialize;

/// One video in a room's playlist, as pushed by the room.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VideoEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub src: String,
    // Anything else the room sends along (duration, thumbnails, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl VideoEntry {
    pub fn new(id: &str, title: &str, author: &str, src: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            src: src.to_string(),
            extra: serde_json::Map::new(),
        }
    }
}

/// The room's ordered playlist at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistSnapshot {
    pub videos: Vec<VideoEntry>,
}

impl PlaylistSnapshot {
    pub fn new(videos: Vec<VideoEntry>) -> Self {
        Self { videos }
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VideoEntry> {
        self.videos.iter()
    }

    /// 1-based lookup, matching how entries are shown to the operator.
    pub fn get(&self, position: usize) -> Option<&VideoEntry> {
        position.checked_sub(1).and_then(|i| self.videos.get(i))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.videos.iter().map(|v| v.id.as_str()).collect()
    }
}

// Shape of the full room state carried by a snapshot push
#[derive(Debug, Clone, Deserialize)]
pub struct RoomState {
    pub playlist: RoomPlaylist,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomPlaylist {
    pub list: Vec<VideoEntry>,
}

// YouTube Data API playlistItems response
#[derive(Debug, Deserialize)]
pub struct PlaylistItemsResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    #[serde(rename = "contentDetails")]
    pub content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
pub struct ContentDetails {
    #[serde(rename = "videoId")]
    pub video_id: String,
}
