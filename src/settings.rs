use once_cell::sync::Lazy;
use std::{env, time::Duration};

/// Holds all tunables and endpoints, read-once from ENV with fallbacks.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the SyncTube HTTP API (the auth challenge lives under it)
    pub synctube_base_url: String,
    /// Base URL of the room websocket endpoint, without the room id
    pub synctube_ws_url: String,
    pub youtube_api_url: String,
    pub youtube_api_key: Option<String>,
    /// Display name announced after connecting; `None` skips the announcement
    pub bot_name: Option<String>,
    /// Delay inserted before every paced message except the first
    pub pacing_interval: Duration,
    pub open_timeout: Duration,
    /// How long to wait for the first playlist snapshot after the room opens
    pub snapshot_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            synctube_base_url: "https://sync-tube.de".to_string(),
            synctube_ws_url: "wss://sync-tube.de/ws".to_string(),
            youtube_api_url: "https://youtube.googleapis.com/youtube/v3".to_string(),
            youtube_api_key: None,
            bot_name: Some("Billy Bot".to_string()),
            pacing_interval: Duration::from_millis(200),
            open_timeout: Duration::from_millis(5000),
            snapshot_timeout: Duration::from_millis(3000),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        // optionally load .env
        let _ = dotenvy::dotenv();

        let defaults = Settings::default();

        // helper to read a string with a fallback
        fn parse_string(var: &str, default: String) -> String {
            env::var(var).ok().filter(|v| !v.is_empty()).unwrap_or(default)
        }

        // helper to parse seconds into Duration
        fn parse_secs(var: &str, default: Duration) -> Duration {
            env::var(var)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        }

        // helper to parse millis into Duration
        fn parse_millis(var: &str, default: Duration) -> Duration {
            env::var(var)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        }

        // an explicitly empty name turns the announcement off
        let bot_name = match env::var("SYNCTUBE_BOT_NAME") {
            Ok(name) if name.trim().is_empty() => None,
            Ok(name) => Some(name),
            Err(_) => defaults.bot_name,
        };

        Settings {
            synctube_base_url: parse_string("SYNCTUBE_BASE_URL", defaults.synctube_base_url),
            synctube_ws_url: parse_string("SYNCTUBE_WS_URL", defaults.synctube_ws_url),
            youtube_api_url: parse_string("YT_API_URL", defaults.youtube_api_url),
            youtube_api_key: env::var("YT_API_KEY").ok().filter(|k| !k.is_empty()),
            bot_name,
            pacing_interval: parse_millis("QUEUE_PACING_MS", defaults.pacing_interval),
            open_timeout: parse_millis("OPEN_TIMEOUT_MS", defaults.open_timeout),
            snapshot_timeout: parse_millis("SNAPSHOT_TIMEOUT_MS", defaults.snapshot_timeout),
            request_timeout: parse_secs("REQUEST_TIMEOUT_SECS", defaults.request_timeout),
        }
    }
}

/// Global settings instance
pub static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);
