use serde::{Deserialize, Serialize};

/// Opaque identity of one connection. Minted by the relay, never reused.
pub type ConnectionId = uuid::Uuid;

/// A point in canvas-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// One piece of a stroke. `color` is only authoritative after the relay
/// has rewritten it from the sender's presence entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawSegment {
    pub points: Vec<Point>,
    pub color: String,
    pub brush_size: f32,
}

/// Live per-connection state tracked by the relay. `cursor` is `None`
/// while the pointer is off the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    pub color: String,
    pub cursor: Option<Point>,
}

/// Point-in-time view of every other participant, sent once on join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub users: Vec<(ConnectionId, Presence)>,
}
