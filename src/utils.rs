use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use reqwest::Url;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::SyncTubeError;

lazy_static! {
    // `s=<token>` at the start of a set-cookie value or after a `;`
    static ref SESSION_COOKIE_RE: Regex = Regex::new(r"(?:^|;)\s*s=([^;]*)").unwrap();
    // room ids end up verbatim in the websocket path
    static ref ROOM_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Extract the session token from a set of `set-cookie` header values.
pub fn extract_session_cookie<'a, I>(set_cookies: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    set_cookies.into_iter().find_map(|header| {
        SESSION_COOKIE_RE
            .captures(header)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// Accept either a bare room id or a full room URL, in which case the last
/// non-empty path segment is the room id. Ids may only contain ASCII letters,
/// digits, `_` and `-`.
pub fn parse_room_id(room: &str) -> Result<String, SyncTubeError> {
    let room = room.trim();
    let room_id = if room.contains("://") {
        let url =
            Url::parse(room).map_err(|e| SyncTubeError::InvalidUrl(format!("{}: {}", room, e)))?;
        url.path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(ToString::to_string)
            .ok_or_else(|| SyncTubeError::InvalidUrl(format!("no room id in '{}'", room)))?
    } else {
        room.to_string()
    };

    if !ROOM_ID_RE.is_match(&room_id) {
        return Err(SyncTubeError::InvalidUrl(format!(
            "invalid room id '{}' in '{}'",
            room_id, room
        )));
    }
    Ok(room_id)
}

/// What a YouTube link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoReference {
    /// A single video, carrying the URL to queue
    Video(String),
    /// A playlist, carrying its id
    Playlist(String),
}

/// Classify a YouTube link as a single video or a playlist.
pub fn classify_youtube_url(input: &str) -> Result<VideoReference, SyncTubeError> {
    let input = input.trim();
    let url = Url::parse(input).map_err(|e| SyncTubeError::InvalidUrl(format!("{}: {}", input, e)))?;
    let host = url.host_str().unwrap_or_default().trim_start_matches("www.");

    match host {
        "youtube.com" | "m.youtube.com" | "music.youtube.com" => match url.path() {
            "/watch" => Ok(VideoReference::Video(input.to_string())),
            "/playlist" => url
                .query_pairs()
                .find(|(key, _)| key == "list")
                .map(|(_, value)| value.into_owned())
                .filter(|list| !list.is_empty())
                .map(VideoReference::Playlist)
                .ok_or_else(|| SyncTubeError::MissingPlaylistId(input.to_string())),
            _ => Err(SyncTubeError::UnsupportedUrl(input.to_string())),
        },
        "youtu.be" => url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|id| !id.is_empty())
            .map(|id| VideoReference::Video(watch_url(id)))
            .ok_or_else(|| SyncTubeError::UnsupportedUrl(input.to_string())),
        _ => Err(SyncTubeError::UnsupportedUrl(input.to_string())),
    }
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// In-place Fisher–Yates shuffle; every permutation is equally likely.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Milliseconds since the Unix epoch, used to stamp outbound messages.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
