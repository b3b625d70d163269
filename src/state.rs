use std::fmt;

/// Lifecycle of a room websocket.
///
/// States only ever move forward: `Connecting -> Open -> Closing -> Closed`,
/// with `Failed` reachable from `Connecting` when the handshake does not
/// succeed. `Closed` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
    Failed(String),
}

impl ConnectionState {
    fn rank(&self) -> u8 {
        match self {
            ConnectionState::Connecting => 0,
            ConnectionState::Open => 1,
            ConnectionState::Closing => 2,
            ConnectionState::Closed | ConnectionState::Failed(_) => 3,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Failed(_))
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    pub fn can_transition_to(&self, next: &ConnectionState) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            ConnectionState::Failed(_) => matches!(self, ConnectionState::Connecting),
            _ => next.rank() > self.rank(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "CONNECTING",
            ConnectionState::Open => "OPEN",
            ConnectionState::Closing => "CLOSING",
            ConnectionState::Closed => "CLOSED",
            ConnectionState::Failed(_) => "FAILED",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Failed(reason) => write!(f, "FAILED ({})", reason),
            other => f.write_str(other.as_str()),
        }
    }
}
