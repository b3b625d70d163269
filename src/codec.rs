// Wire format of the SyncTube room protocol.
//
// Outbound: `[<code>,<json payload>,<timestamp ms>]`, or `[<code>,<json payload>]`
// for messages that carry no timestamp.
// Inbound: `[<code>,<json body>]`. Inbound and outbound frames are parsed and
// produced separately; nothing here assumes they are symmetric.

use serde::Serialize;

use crate::commands::RoomCommand;
use crate::SyncTubeError;

#[derive(Serialize)]
struct QueuePayload<'a> {
    src: &'a str,
}

#[derive(Serialize)]
struct RemovePayload<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct MovePayload<'a> {
    id: &'a str,
    dir: i8,
}

/// Encode a command as an outbound text frame.
pub fn encode_command(command: &RoomCommand, timestamp_ms: u64) -> Result<String, SyncTubeError> {
    let payload = match command {
        RoomCommand::SetName { name } => serde_json::to_string(name)?,
        RoomCommand::QueueVideo { src } => serde_json::to_string(&QueuePayload { src })?,
        RoomCommand::RemoveVideo { id } => serde_json::to_string(&RemovePayload { id })?,
        RoomCommand::MoveVideoUp { id } => serde_json::to_string(&MovePayload { id, dir: 1 })?,
    };

    if command.is_timestamped() {
        Ok(format!("[{},{},{}]", command.code(), payload, timestamp_ms))
    } else {
        Ok(format!("[{},{}]", command.code(), payload))
    }
}

/// An inbound frame split into its type code and raw JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundFrame<'a> {
    pub code: u16,
    pub body: &'a str,
}

/// Split an inbound frame into code and body.
///
/// Returns `None` for anything that is not shaped like `[<digits>,<body>]`;
/// the body itself is not validated here.
pub fn decode_frame(frame: &str) -> Option<InboundFrame<'_>> {
    let inner = frame.trim().strip_prefix('[')?.strip_suffix(']')?;
    let (code, body) = inner.split_once(',')?;
    let code = code.trim();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let code = code.parse::<u16>().ok()?;
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    Some(InboundFrame { code, body })
}
