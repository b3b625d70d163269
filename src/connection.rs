use std::sync::{Arc, PoisonError, RwLock};

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{header::COOKIE, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use crate::auth::Credential;
use crate::codec::encode_command;
use crate::commands::RoomCommand;
use crate::poller::{send_paced, wait_until};
use crate::state::ConnectionState;
use crate::utils::now_millis;
use crate::SyncTubeError;

/// Fixed client profile (display name and colour, base64 encoded) that the
/// room expects as the last path segment of the websocket URL.
pub const CLIENT_IDENTITY: &str =
    "ey4iLnUucy5lLnIuIi46LnsuIi5uLmEubS5lLiIuOi4icGlyYXRlYm9vdHkiLiwuIi5jLm8ubC5vLnIuIi46LiIuIy41LmMuNC4xLjguMy4iLn0ufS4=";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// Callback invoked with the text of every inbound frame.
pub type MessageHandler = Box<dyn Fn(&str) + Send + Sync + 'static>;

/// Websocket URL for a room.
pub fn room_url(ws_base: &str, room_id: &str) -> String {
    format!(
        "{}/{}/{}",
        ws_base.trim_end_matches('/'),
        room_id,
        CLIENT_IDENTITY
    )
}

// State shared between a RoomConnection and its reader task
struct ConnectionContext {
    room_id: String,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    handlers: Arc<RwLock<Vec<MessageHandler>>>,
    sink: Arc<Mutex<Option<WsSink>>>,
    shutdown_notify: Arc<Notify>,
}

impl ConnectionContext {
    fn dispatch(&self, frame: &str) {
        trace!(room_id = %self.room_id, frame, "Inbound frame");
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        for handler in handlers.iter() {
            handler(frame);
        }
    }
}

/// Move the connection state forward, refusing anything non-monotonic.
fn advance(state_tx: &watch::Sender<ConnectionState>, next: ConnectionState) -> bool {
    state_tx.send_if_modified(|current| {
        if current.can_transition_to(&next) {
            trace!(from = %current, to = %next, "Connection state change");
            *current = next;
            true
        } else {
            false
        }
    })
}

/// One websocket connection to one SyncTube room.
///
/// Created in `Connecting`; the handshake and all reads happen on a
/// background task. Writes go through [`RoomConnection::send`] and are only
/// accepted while the connection is `Open`.
pub struct RoomConnection {
    room_id: String,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    state_rx: watch::Receiver<ConnectionState>,
    handlers: Arc<RwLock<Vec<MessageHandler>>>,
    sink: Arc<Mutex<Option<WsSink>>>,
    shutdown_notify: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RoomConnection {
    /// Start the websocket handshake for `room_id`, authenticating with the
    /// session cookie. Returns immediately; use
    /// [`RoomConnection::wait_until_open`] to wait for the socket.
    ///
    /// Handlers added later with [`RoomConnection::on_message`] may miss
    /// frames the room pushes right after the handshake; use
    /// [`RoomConnection::connect_with_handlers`] when those matter.
    pub fn connect(
        ws_base: &str,
        room_id: &str,
        credential: &Credential,
    ) -> Result<Self, SyncTubeError> {
        Self::connect_with_handlers(ws_base, room_id, credential, Vec::new())
    }

    /// Like [`RoomConnection::connect`], with `handlers` registered before the
    /// background task starts so they see every inbound frame.
    pub fn connect_with_handlers(
        ws_base: &str,
        room_id: &str,
        credential: &Credential,
        handlers: Vec<MessageHandler>,
    ) -> Result<Self, SyncTubeError> {
        let url = room_url(ws_base, room_id);
        let mut request: Request = url.as_str().into_client_request()?;
        let cookie = HeaderValue::from_str(&credential.cookie_header())
            .map_err(|e| SyncTubeError::Auth(format!("session cookie is not a valid header: {}", e)))?;
        request.headers_mut().insert(COOKIE, cookie);

        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let state_tx = Arc::new(state_tx);
        let handlers: Arc<RwLock<Vec<MessageHandler>>> = Arc::new(RwLock::new(handlers));
        let sink = Arc::new(Mutex::new(None));
        let shutdown_notify = Arc::new(Notify::new());

        let ctx = ConnectionContext {
            room_id: room_id.to_string(),
            state_tx: state_tx.clone(),
            handlers: handlers.clone(),
            sink: sink.clone(),
            shutdown_notify: shutdown_notify.clone(),
        };

        info!(%room_id, "Connecting to room");
        let handle = tokio::spawn(run_connection(ctx, request));

        Ok(Self {
            room_id: room_id.to_string(),
            state_tx,
            state_rx,
            handlers,
            sink,
            shutdown_notify,
            task: Mutex::new(Some(handle)),
        })
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn state(&self) -> ConnectionState {
        self.state_rx.borrow().clone()
    }

    /// Register a callback for every inbound text frame, in arrival order.
    pub fn on_message<F>(&self, handler: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers.push(Box::new(handler));
    }

    /// Wait for the handshake to finish.
    ///
    /// Fails with [`SyncTubeError::ConnectTimeout`] if the room is not open
    /// within `timeout`, or earlier with [`SyncTubeError::ConnectFailed`] if
    /// the handshake was rejected.
    pub async fn wait_until_open(&self, timeout: Duration) -> Result<(), SyncTubeError> {
        let waited = wait_until(
            || *self.state_rx.borrow() != ConnectionState::Connecting,
            timeout,
        )
        .await;

        match (waited, self.state()) {
            (_, ConnectionState::Open) => Ok(()),
            (Err(_), _) => {
                warn!(room_id = %self.room_id, ?timeout, "Room did not open in time");
                Err(SyncTubeError::ConnectTimeout {
                    room_id: self.room_id.clone(),
                    timeout,
                })
            }
            (Ok(()), ConnectionState::Failed(reason)) => Err(SyncTubeError::ConnectFailed {
                room_id: self.room_id.clone(),
                reason,
            }),
            (Ok(()), state) => Err(SyncTubeError::NotConnected(state)),
        }
    }

    /// Send one command. Rejected with [`SyncTubeError::NotConnected`] unless
    /// the connection is open.
    pub async fn send(&self, command: &RoomCommand) -> Result<(), SyncTubeError> {
        let state = self.state();
        if !state.is_open() {
            warn!(command = command.name(), %state, "Attempted to send while not connected");
            return Err(SyncTubeError::NotConnected(state));
        }

        let frame = encode_command(command, now_millis())?;
        let mut guard = self.sink.lock().await;
        let Some(sink) = guard.as_mut() else {
            return Err(SyncTubeError::NotConnected(self.state()));
        };
        debug!(command = command.name(), %frame, "Sending room message");
        sink.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    /// Send `commands` in order, waiting `pacing` before each one after the
    /// first so the room does not throttle us.
    pub async fn send_paced(
        &self,
        commands: Vec<RoomCommand>,
        pacing: Duration,
    ) -> Result<usize, SyncTubeError> {
        let total = commands.len();
        debug!(total, ?pacing, "Sending paced room messages");
        send_paced(commands, pacing, move |command| async move {
            self.send(&command).await
        })
        .await
    }

    /// Close the websocket. Safe to call any number of times.
    pub async fn close(&self) -> Result<(), SyncTubeError> {
        advance(&self.state_tx, ConnectionState::Closing);

        let sink = self.sink.lock().await.take();
        if let Some(mut sink) = sink {
            debug!(room_id = %self.room_id, "Sending close frame");
            if let Err(e) = sink.close().await {
                debug!(error = %e, "Error while closing websocket (ignored)");
            }
        }

        self.shutdown_notify.notify_one();
        let handle = self.task.lock().await.take();
        let joined = match handle {
            Some(handle) => handle.await,
            None => Ok(()),
        };

        // the socket is gone either way, even if the reader task panicked
        advance(&self.state_tx, ConnectionState::Closed);
        if let Err(e) = joined {
            error!(room_id = %self.room_id, error = %e, "Room reader task did not finish cleanly");
            return Err(e.into());
        }
        info!(room_id = %self.room_id, "Room connection closed");
        Ok(())
    }
}

async fn run_connection(ctx: ConnectionContext, request: Request) {
    let connected = tokio::select! {
        biased;

        _ = ctx.shutdown_notify.notified() => {
            debug!(room_id = %ctx.room_id, "Shutdown requested before the room opened");
            advance(&ctx.state_tx, ConnectionState::Closed);
            return;
        }
        res = connect_async(request) => res,
    };

    let ws_stream = match connected {
        Ok((ws_stream, response)) => {
            debug!(status = %response.status(), "Websocket handshake complete");
            ws_stream
        }
        Err(e) => {
            error!(room_id = %ctx.room_id, error = %e, "Failed to open room websocket");
            advance(&ctx.state_tx, ConnectionState::Failed(e.to_string()));
            return;
        }
    };

    let (sink, mut stream) = ws_stream.split();
    *ctx.sink.lock().await = Some(sink);
    if advance(&ctx.state_tx, ConnectionState::Open) {
        info!(room_id = %ctx.room_id, "Room websocket open");
    }

    loop {
        tokio::select! {
            biased;

            _ = ctx.shutdown_notify.notified() => {
                debug!("Reader task received shutdown notification");
                break;
            }
            next = stream.next() => {
                match next {
                    Some(Ok(Message::Text(text))) => ctx.dispatch(text.as_str()),
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, "Room closed the websocket");
                        break;
                    }
                    Some(Ok(_)) => trace!("Ignoring non-text frame"),
                    Some(Err(e)) => {
                        warn!(error = %e, "Websocket read error");
                        break;
                    }
                    None => {
                        debug!("Websocket stream ended");
                        break;
                    }
                }
            }
        }
    }

    // Release the write half unless close() already took it
    let sink = ctx.sink.lock().await.take();
    if let Some(mut sink) = sink {
        let _ = sink.close().await;
    }
    advance(&ctx.state_tx, ConnectionState::Closed);
}

impl std::fmt::Debug for RoomConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomConnection")
            .field("room_id", &self.room_id)
            .field("state", &self.state())
            .finish()
    }
}

// Make sure the reader task stops and releases the socket on drop
impl Drop for RoomConnection {
    fn drop(&mut self) {
        if !self.state().is_terminal() {
            debug!(room_id = %self.room_id, "Dropping RoomConnection, signalling reader task to stop");
        }
        self.shutdown_notify.notify_one();
    }
}
