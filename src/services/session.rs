//! Session coordinator: connection lifecycle, presence, and fan-out.
//!
//! Every operation takes the single coordinator lock, so all clients observe
//! roster updates and record events in the same order. Pushes go through each
//! connection's unbounded outbox and never wait on the peer; a closed outbox
//! means the writer task is gone, and the recipient is disconnected on the spot.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, instrument, warn};

use crate::models::event::ServerEvent;
use crate::models::presence::ConnectionId;
use crate::models::record::Record;
use crate::services::presence::PresenceTable;

/// Sending half of a connection's outbound frame queue.
pub type Outbox = mpsc::UnboundedSender<String>;

/// Lifecycle of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Accepted, no name yet.
    Connected,
    /// Bound in the presence table.
    Joined,
    /// Terminal. Also reported for ids the coordinator never saw.
    Closed,
}

/// Result of a join operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// First join on this connection.
    Joined,
    /// Repeated join; the previous name was overwritten.
    Renamed,
    /// The connection is closed; nothing happened.
    Discarded,
}

struct Connection {
    state: ConnectionState,
    outbox: Outbox,
}

#[derive(Default)]
struct SessionInner {
    connections: HashMap<ConnectionId, Connection>,
    presence: PresenceTable,
}

impl SessionInner {
    /// Push `frame` to every live connection. Returns the recipients whose outbox is closed.
    fn fan_out(&self, frame: &str) -> Vec<ConnectionId> {
        let mut failed = Vec::new();
        for (id, conn) in &self.connections {
            if conn.outbox.send(frame.to_string()).is_err() {
                warn!(connection_id = %id, "push failed, dropping connection");
                failed.push(id.clone());
            }
        }
        failed
    }

    fn broadcast(&mut self, event: &ServerEvent) {
        let frame = match event.to_frame() {
            Ok(f) => f,
            Err(e) => {
                error!(error = %e, "failed to encode event");
                return;
            }
        };
        let failed = self.fan_out(&frame);
        self.close_all(failed);
    }

    fn broadcast_roster(&mut self) {
        let roster = self.presence.snapshot();
        debug!(online = roster.len(), "roster broadcast");
        self.broadcast(&ServerEvent::RosterUpdate(roster));
    }

    fn send_to(&mut self, id: &ConnectionId, event: &ServerEvent) {
        let Some(conn) = self.connections.get(id) else {
            return;
        };
        let frame = match event.to_frame() {
            Ok(f) => f,
            Err(e) => {
                error!(error = %e, "failed to encode event");
                return;
            }
        };
        if conn.outbox.send(frame).is_err() {
            warn!(connection_id = %id, "push failed, dropping connection");
            self.close_all(vec![id.clone()]);
        }
    }

    /// Run the close transition for one connection. Returns false if it was already closed.
    fn close(&mut self, id: &ConnectionId) -> bool {
        if self.connections.remove(id).is_none() {
            return false;
        }
        if let Some(name) = self.presence.unbind(id) {
            info!(connection_id = %id, name = %name, "left");
            self.broadcast_roster();
        }
        true
    }

    fn close_all(&mut self, ids: Vec<ConnectionId>) {
        for id in ids {
            self.close(&id);
        }
    }
}

/// Owns the presence table and the set of live connections.
#[derive(Clone, Default)]
pub struct SessionCoordinator {
    inner: Arc<Mutex<SessionInner>>,
}

impl SessionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an accepted connection in the `Connected` state.
    #[instrument(skip(self, outbox))]
    pub async fn register(&self, id: ConnectionId, outbox: Outbox) {
        let mut inner = self.inner.lock().await;
        inner.connections.insert(
            id,
            Connection {
                state: ConnectionState::Connected,
                outbox,
            },
        );
    }

    /// Bind `display_name` to the connection and broadcast the roster to everyone.
    ///
    /// The first join also sends `connection_confirmed` to the joiner. A repeated
    /// join overwrites the name and re-broadcasts without confirming again.
    #[instrument(skip(self))]
    pub async fn join(&self, id: &ConnectionId, display_name: &str) -> JoinOutcome {
        let mut inner = self.inner.lock().await;
        let outcome = match inner.connections.get_mut(id) {
            None => {
                debug!(connection_id = %id, "join on closed connection discarded");
                return JoinOutcome::Discarded;
            }
            Some(conn) if conn.state == ConnectionState::Joined => JoinOutcome::Renamed,
            Some(conn) => {
                conn.state = ConnectionState::Joined;
                JoinOutcome::Joined
            }
        };

        inner.presence.bind(id, display_name);
        info!(connection_id = %id, name = %display_name, ?outcome, "joined");
        inner.broadcast_roster();
        if outcome == JoinOutcome::Joined {
            inner.send_to(id, &ServerEvent::ConnectionConfirmed);
        }
        outcome
    }

    /// Close the connection. Idempotent: returns true only for the call that closed it.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, id: &ConnectionId) -> bool {
        let mut inner = self.inner.lock().await;
        inner.close(id)
    }

    /// Push a newly stored record to every connection, joined or not.
    #[instrument(skip(self, record), fields(record_id = record.id))]
    pub async fn broadcast_record_created(&self, record: &Record) {
        let mut inner = self.inner.lock().await;
        inner.broadcast(&ServerEvent::RecordCreated(record.clone()));
    }

    /// Push a record removal to every connection, joined or not.
    #[instrument(skip(self))]
    pub async fn broadcast_record_removed(&self, id: i64) {
        let mut inner = self.inner.lock().await;
        inner.broadcast(&ServerEvent::RecordRemoved { id });
    }

    /// Point-to-point push. Silently ignored for closed connections.
    pub async fn send_to(&self, id: &ConnectionId, event: &ServerEvent) {
        let mut inner = self.inner.lock().await;
        inner.send_to(id, event);
    }

    /// Current roster, in join order.
    pub async fn roster(&self) -> Vec<String> {
        self.inner.lock().await.presence.snapshot()
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.lock().await.connections.len()
    }

    pub async fn state_of(&self, id: &ConnectionId) -> ConnectionState {
        self.inner
            .lock()
            .await
            .connections
            .get(id)
            .map(|c| c.state)
            .unwrap_or(ConnectionState::Closed)
    }
}
