use tokio::sync::mpsc::{channel, Sender};

use system::{ConnectionId, DrawSegment, SessionCommand, SessionEvent};

use crate::admin::{AdminCommand, ConnectionDescription};
use crate::connection::{ConnectionCommand, ConnectionEvent};
use crate::connection_tx_storage::ConnectionTxStorage;
use crate::server_state::ServerState;

pub type ServerTx = Sender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    ConnectionCommand(ConnectionCommand),
    AdminCommand(AdminCommand),
}

struct Server {
    server_state: ServerState,
    connections: ConnectionTxStorage,
}

impl Server {
    fn new() -> Self {
        Self {
            server_state: ServerState::new(),
            connections: ConnectionTxStorage::new(),
        }
    }

    async fn handle_server_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::ConnectionCommand(command) => {
                self.handle_connection_command(command).await
            }
            ServerCommand::AdminCommand(command) => self.handle_admin_command(command),
        }
    }

    async fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => {
                let (connection_id, color) = self.server_state.create_connection();
                self.connections.insert(connection_id, tx);
                log::info!("Connection {} joined with color {}", connection_id, color);

                let delivered = self
                    .connections
                    .send(&connection_id, ConnectionEvent::Connected { connection_id })
                    .await;
                if !delivered {
                    self.reap(vec![connection_id]).await;
                    return;
                }

                let session_snapshot = self.server_state.snapshot_without(&connection_id);
                let delivered = self
                    .connections
                    .send(
                        &connection_id,
                        ConnectionEvent::SessionEvent(SessionEvent::Init {
                            connection_id,
                            color: color.clone(),
                            session_snapshot,
                        }),
                    )
                    .await;
                if !delivered {
                    self.reap(vec![connection_id]).await;
                    return;
                }

                let dropped = self
                    .broadcast(
                        SessionEvent::Joined {
                            connection_id,
                            color,
                        },
                        Some(&connection_id),
                    )
                    .await;
                self.reap(dropped).await;
            }
            ConnectionCommand::Disconnect { from } => {
                self.reap(vec![from]).await;
            }
            ConnectionCommand::SessionCommand { from, command } => {
                self.handle_session_command(&from, command).await;
            }
        }
    }

    async fn handle_session_command(&mut self, from: &ConnectionId, command: SessionCommand) {
        let event = match command {
            SessionCommand::Draw(segment) => match self.server_state.color_of(from) {
                Some(color) => SessionEvent::Draw {
                    connection_id: *from,
                    // the claimed color is never trusted
                    segment: DrawSegment { color, ..segment },
                },
                None => return, // raced with its own disconnect
            },
            SessionCommand::ColorChange { color } => {
                if self.server_state.update_color(from, &color) {
                    SessionEvent::ColorChanged {
                        connection_id: *from,
                        color,
                    }
                } else {
                    return;
                }
            }
            SessionCommand::Cursor { position } => {
                if self.server_state.update_cursor(from, position) {
                    SessionEvent::Cursor {
                        connection_id: *from,
                        position,
                    }
                } else {
                    return;
                }
            }
            SessionCommand::Clear => {
                if !self.server_state.contains(from) {
                    return;
                }
                SessionEvent::Cleared
            }
        };

        let dropped = self.broadcast(event, Some(from)).await;
        self.reap(dropped).await;
    }

    fn handle_admin_command(&mut self, command: AdminCommand) {
        match command {
            AdminCommand::ListConnections { tx } => {
                let connections = self
                    .server_state
                    .presences()
                    .map(|(connection_id, presence)| ConnectionDescription {
                        connection_id: *connection_id,
                        color: presence.color.clone(),
                        cursor: presence.cursor,
                    })
                    .collect();
                if tx.send(connections).is_err() {
                    log::warn!("Admin requester went away before the reply");
                }
            }
        }
    }

    /// Fans `event` out to every active connection except `without`,
    /// iterating a point-in-time target list. Returns the connections
    /// whose channel turned out to be dead; delivery to the rest is
    /// unaffected.
    async fn broadcast(
        &mut self,
        event: SessionEvent,
        without: Option<&ConnectionId>,
    ) -> Vec<ConnectionId> {
        let targets = self.server_state.connection_ids();
        let mut dropped = Vec::new();
        for connection_id in targets {
            if without.map_or(false, |c| *c == connection_id) {
                continue;
            }
            let delivered = self
                .connections
                .send(
                    &connection_id,
                    ConnectionEvent::SessionEvent(event.clone()),
                )
                .await;
            if !delivered {
                dropped.push(connection_id);
            }
        }
        dropped
    }

    /// Removes dead connections and announces each departure once. A
    /// failed `Left` delivery surfaces more dead connections, so this
    /// drains a worklist instead of recursing.
    async fn reap(&mut self, mut dead: Vec<ConnectionId>) {
        while let Some(connection_id) = dead.pop() {
            if self.server_state.remove_connection(&connection_id).is_none() {
                continue; // already gone
            }
            self.connections.remove(&connection_id);
            log::info!("Connection {} left", connection_id);
            let more = self.broadcast(SessionEvent::Left { connection_id }, None).await;
            dead.extend(more);
        }
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ServerCommand>(16);

    tokio::spawn(async move {
        let mut server = Box::new(Server::new());

        while let Some(command) = srv_rx.recv().await {
            server.handle_server_command(command).await;
        }
    });

    return srv_tx;
}
