// Local stand-ins for the SyncTube endpoints used by the integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

use synctube_rs::Settings;

/// Build a raw HTTP/1.1 response.
pub fn http_response(status_line: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut out = format!("HTTP/1.1 {}\r\n", status_line);
    for (name, value) in headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    ));
    out
}

/// What the real user endpoint answers to an anonymous request.
pub fn auth_challenge_response() -> String {
    http_response(
        "401 Unauthorized",
        &[("Set-Cookie", "s=test-session; Path=/; HttpOnly")],
        "",
    )
}

/// Serve `response` to every HTTP request and count the connections served.
pub async fn spawn_http(response: String) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                // read until the end of the request headers
                loop {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            buf.extend_from_slice(&chunk[..n]);
                            if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, hits)
}

/// A listener that accepts TCP connections and never answers, so websocket
/// handshakes against it never complete.
pub async fn spawn_silent_listener() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// Room snapshot push for `(id, title)` pairs.
pub fn snapshot_frame(videos: &[(&str, &str)]) -> String {
    let list: Vec<Value> = videos
        .iter()
        .map(|(id, title)| {
            json!({
                "id": id,
                "title": title,
                "author": "someone",
                "src": format!("https://www.youtube.com/watch?v={}", id),
                "duration": 212
            })
        })
        .collect();
    format!(
        "[0,{}]",
        json!({ "playlist": { "list": list, "pos": 0 }, "users": [] })
    )
}

#[derive(Debug)]
pub enum ServerEvent {
    Handshake { path: String, cookie: Option<String> },
    Frame { text: String, at: Instant },
    Closed,
}

#[derive(Debug)]
pub struct ReceivedFrame {
    pub text: String,
    pub at: Instant,
}

/// Everything the mock room saw from one client connection.
#[derive(Debug, Default)]
pub struct RoomSession {
    pub path: String,
    pub cookie: Option<String>,
    pub frames: Vec<ReceivedFrame>,
}

impl RoomSession {
    pub fn texts(&self) -> Vec<&str> {
        self.frames.iter().map(|f| f.text.as_str()).collect()
    }
}

/// Mock SyncTube: the auth challenge endpoint plus a room websocket that
/// pushes `greeting` frames after an optional delay and records what the
/// client sends.
pub struct MockRoom {
    pub ws_addr: SocketAddr,
    pub http_addr: SocketAddr,
    auth_hits: Arc<AtomicUsize>,
    events: mpsc::UnboundedReceiver<ServerEvent>,
}

impl MockRoom {
    pub async fn start(greeting: Vec<String>) -> Self {
        Self::start_delayed(greeting, Duration::ZERO).await
    }

    pub async fn start_delayed(greeting: Vec<String>, delay: Duration) -> Self {
        let (http_addr, auth_hits) = spawn_http(auth_challenge_response()).await;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_addr = listener.local_addr().unwrap();
        let (tx, events) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let tx = tx.clone();
                let greeting = greeting.clone();
                tokio::spawn(async move {
                    let handshake_tx = tx.clone();
                    let callback =
                        move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                            let cookie = req
                                .headers()
                                .get("cookie")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string);
                            let _ = handshake_tx.send(ServerEvent::Handshake {
                                path: req.uri().path().to_string(),
                                cookie,
                            });
                            Ok(resp)
                        };
                    let Ok(ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
                        return;
                    };
                    let (mut write, mut read) = ws.split();

                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    for frame in greeting {
                        if write.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }

                    while let Some(msg) = read.next().await {
                        match msg {
                            Ok(Message::Text(text)) => {
                                let _ = tx.send(ServerEvent::Frame {
                                    text: text.as_str().to_string(),
                                    at: Instant::now(),
                                });
                            }
                            Ok(Message::Close(_)) | Err(_) => break,
                            Ok(_) => {}
                        }
                    }
                    let _ = tx.send(ServerEvent::Closed);
                });
            }
        });

        Self {
            ws_addr,
            http_addr,
            auth_hits,
            events,
        }
    }

    /// Settings pointing at this mock, with short timeouts and no bot name.
    pub fn settings(&self) -> Settings {
        Settings {
            synctube_base_url: format!("http://{}", self.http_addr),
            synctube_ws_url: format!("ws://{}/ws", self.ws_addr),
            bot_name: None,
            pacing_interval: Duration::from_millis(30),
            open_timeout: Duration::from_secs(2),
            snapshot_timeout: Duration::from_millis(500),
            ..Settings::default()
        }
    }

    pub fn auth_requests(&self) -> usize {
        self.auth_hits.load(Ordering::SeqCst)
    }

    pub async fn next_event(&mut self) -> ServerEvent {
        timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("timed out waiting for the mock room")
            .expect("mock room stopped")
    }

    /// Collect one client connection from handshake to close.
    pub async fn session(&mut self) -> RoomSession {
        let mut session = RoomSession::default();
        loop {
            match self.next_event().await {
                ServerEvent::Handshake { path, cookie } => {
                    session.path = path;
                    session.cookie = cookie;
                }
                ServerEvent::Frame { text, at } => session.frames.push(ReceivedFrame { text, at }),
                ServerEvent::Closed => return session,
            }
        }
    }

    /// Assert that no client connected or sent anything for `wait`.
    pub async fn assert_idle(&mut self, wait: Duration) {
        if let Ok(event) = timeout(wait, self.events.recv()).await {
            panic!("expected no room activity, got {:?}", event);
        }
    }
}
