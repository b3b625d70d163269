use std::fmt;

use reqwest::{header::SET_COOKIE, Client, StatusCode};
use tracing::{debug, error, info};

use crate::utils::extract_session_cookie;
use crate::SyncTubeError;

/// Session token handed out by the room service's auth challenge.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// Value for the `Cookie` header of the websocket handshake.
    pub fn cookie_header(&self) -> String {
        format!("s={}", self.0)
    }
}

// Keep the token out of logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview = self.0.chars().take(4).collect::<String>();
        write!(f, "Credential({}…)", preview)
    }
}

/// Obtain a session credential from the unauthenticated user endpoint.
///
/// The endpoint is expected to answer `401 Unauthorized` while still setting
/// the `s` session cookie. Any other status, or a missing cookie, is an
/// [`SyncTubeError::Auth`]. One request, no retries.
pub async fn authenticate(client: &Client, base_url: &str) -> Result<Credential, SyncTubeError> {
    let url = format!("{}/api/user", base_url.trim_end_matches('/'));
    debug!(%url, "Requesting session cookie");

    let response = client.get(&url).send().await?;
    let status = response.status();
    if status != StatusCode::UNAUTHORIZED {
        error!(%status, "Auth challenge returned an unexpected status");
        return Err(SyncTubeError::Auth(format!(
            "expected 401 Unauthorized from {}, got {}",
            url, status
        )));
    }

    let set_cookies: Vec<&str> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    match extract_session_cookie(set_cookies.iter().copied()) {
        Some(token) => {
            info!("Obtained session credential");
            Ok(Credential::new(token))
        }
        None => {
            error!(cookies = ?set_cookies, "Auth challenge response had no session cookie");
            Err(SyncTubeError::Auth(format!(
                "no 's' cookie in response from {} (set-cookie: {:?})",
                url, set_cookies
            )))
        }
    }
}
