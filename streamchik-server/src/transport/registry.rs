use crate::transport::connection::Connection;
use std::sync::Arc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use streamchik_core::{ConnectionId, RoomName, SignalMessage};
use tokio::sync::{Notify, mpsc};
use tokio::time::Instant;
use tracing::{debug, error};

/// Tracks every live transport connection and hands out identifiers.
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Connection>,
    next_id: AtomicU64,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a transport and returns its freshly allocated id.
    ///
    /// Ids are strictly increasing for the lifetime of the registry, also
    /// under concurrent registration.
    pub fn register(&self, outbound: mpsc::UnboundedSender<String>) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.connections.insert(id, Connection::new(id, outbound));
        id
    }

    pub fn unregister(&self, id: ConnectionId) {
        self.connections.remove(&id);
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn current_room(&self, id: ConnectionId) -> Option<RoomName> {
        self.connections.get(&id).and_then(|c| c.room.clone())
    }

    pub(crate) fn set_room(&self, id: ConnectionId, room: RoomName) -> bool {
        match self.connections.get_mut(&id) {
            Some(mut connection) => {
                connection.room = Some(room);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_room(&self, id: ConnectionId) -> Option<RoomName> {
        self.connections
            .get_mut(&id)
            .and_then(|mut connection| connection.room.take())
    }

    /// Records a heartbeat response.
    pub fn touch(&self, id: ConnectionId) {
        if let Some(mut connection) = self.connections.get_mut(&id) {
            connection.last_heartbeat = Instant::now();
        }
    }

    pub fn last_heartbeat(&self, id: ConnectionId) -> Option<Instant> {
        self.connections.get(&id).map(|c| c.last_heartbeat)
    }

    /// Snapshot of `(id, last heartbeat)` for every open connection that is
    /// not already being terminated.
    ///
    /// Taken up front so that callers can send while iterating without
    /// holding map guards.
    pub fn heartbeats(&self) -> Vec<(ConnectionId, Instant)> {
        self.connections
            .iter()
            .filter(|entry| entry.is_open() && !entry.is_terminated())
            .map(|entry| (*entry.key(), entry.last_heartbeat))
            .collect()
    }

    /// Signal the socket task of `id` waits on to drop its transport.
    pub fn termination(&self, id: ConnectionId) -> Option<Arc<Notify>> {
        self.connections.get(&id).map(|c| c.termination())
    }

    /// Asks the socket task of `id` to drop the transport, even if frames are
    /// still queued for it. Returns `true` only for the first request.
    pub fn terminate(&self, id: ConnectionId) -> bool {
        self.connections
            .get_mut(&id)
            .is_some_and(|mut connection| connection.terminate())
    }

    pub fn is_terminated(&self, id: ConnectionId) -> bool {
        self.connections.get(&id).is_some_and(|c| c.is_terminated())
    }

    /// Sends one message to one connection. Returns `false` when the
    /// connection is unknown or already closed.
    pub fn send(&self, id: ConnectionId, msg: &SignalMessage) -> bool {
        match msg.to_json() {
            Ok(json) => self.send_raw(id, json),
            Err(e) => {
                error!("Failed to serialize {} message: {}", msg.kind(), e);
                false
            }
        }
    }

    fn send_raw(&self, id: ConnectionId, json: String) -> bool {
        let Some(connection) = self.connections.get(&id) else {
            return false;
        };
        if !connection.is_open() {
            return false;
        }
        connection.push(json)
    }

    /// Sends `msg` to every id in `members` except `except`.
    ///
    /// Closed or vanished connections are skipped silently. Returns how many
    /// connections the frame was handed to.
    pub fn broadcast(
        &self,
        members: &[ConnectionId],
        msg: &SignalMessage,
        except: Option<ConnectionId>,
    ) -> usize {
        let json = match msg.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize {} message: {}", msg.kind(), e);
                return 0;
            }
        };

        let delivered = members
            .iter()
            .filter(|id| Some(**id) != except)
            .filter(|id| self.send_raw(**id, json.clone()))
            .count();

        debug!("Broadcast {} to {} connection(s)", msg.kind(), delivered);
        delivered
    }
}
