use system::serde::Serialize;
use system::{ConnectionId, Point};
use tokio::sync::oneshot::Sender;

#[derive(Debug)]
pub enum AdminCommand {
    ListConnections {
        tx: Sender<Vec<ConnectionDescription>>,
    },
}

/// One row of the admin presence table.
#[derive(Debug, Serialize)]
pub struct ConnectionDescription {
    pub connection_id: ConnectionId,
    pub color: String,
    pub cursor: Option<Point>,
}
