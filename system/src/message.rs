use crate::types::*;
use serde::{Deserialize, Serialize};

/// Everything a client may ask of the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionCommand {
    Draw(DrawSegment),
    ColorChange { color: String },
    Cursor { position: Option<Point> },
    Clear,
}

/// Everything the relay may tell a client.
///
/// `Draw`, `ColorChanged` and `Cursor` always carry the relay-stamped
/// author identity; client-claimed identities never reach the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    Init {
        connection_id: ConnectionId,
        color: String,
        session_snapshot: SessionSnapshot,
    },
    Joined {
        connection_id: ConnectionId,
        color: String,
    },
    Left {
        connection_id: ConnectionId,
    },
    Draw {
        connection_id: ConnectionId,
        segment: DrawSegment,
    },
    ColorChanged {
        connection_id: ConnectionId,
        color: String,
    },
    Cursor {
        connection_id: ConnectionId,
        position: Option<Point>,
    },
    Cleared,
}
