use crate::room::Room;
use crate::transport::ConnectionRegistry;
use dashmap::DashMap;
use std::sync::Arc;
use streamchik_core::{ConnectionId, RoomName, SignalMessage};
use tracing::{debug, info, warn};

/// Maps room name to member set.
///
/// Rooms are created on first join and removed as soon as they run empty.
/// A connection's current room is recorded on its registry entry, which is
/// what keeps it in at most one room at a time.
pub struct RoomDirectory {
    rooms: DashMap<RoomName, Room>,
    registry: Arc<ConnectionRegistry>,
}

impl RoomDirectory {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            rooms: DashMap::new(),
            registry,
        }
    }

    /// Places `id` into `room`, leaving its previous room first.
    ///
    /// Sends `welcome` to the joiner followed by a `peers` broadcast to the
    /// room. Joining the room the connection is already in does nothing and
    /// returns `false`.
    pub fn join(&self, id: ConnectionId, room: RoomName) -> bool {
        if !self.registry.contains(id) {
            warn!("Join from unknown connection {}", id);
            return false;
        }

        if self.registry.current_room(id).as_ref() == Some(&room) {
            debug!("{} is already in room '{}'", id, room);
            return false;
        }

        self.leave(id);

        // membership change and the frames announcing it happen under the
        // room's guard so every member sees snapshots in mutation order
        let mut members = self.rooms.entry(room.clone()).or_default();
        members.insert(id);
        self.registry.set_room(id, room.clone());
        info!("{} joined room '{}'", id, room);

        self.registry.send(
            id,
            &SignalMessage::Welcome {
                room: room.clone(),
                id,
            },
        );
        self.broadcast_peers(&room, &members);
        true
    }

    /// Removes `id` from its current room and tells the remaining members.
    ///
    /// Returns the room that was left, if any.
    pub fn leave(&self, id: ConnectionId) -> Option<RoomName> {
        let room = self.registry.take_room(id)?;

        let emptied = match self.rooms.get_mut(&room) {
            Some(mut members) => {
                members.remove(id);
                self.broadcast_peers(&room, &members);
                members.is_empty()
            }
            None => false,
        };

        if emptied {
            // a concurrent joiner may have refilled it in between
            if self.rooms.remove_if(&room, |_, r| r.is_empty()).is_some() {
                debug!("Room '{}' is empty, removed", room);
            }
        }

        info!("{} left room '{}'", id, room);
        Some(room)
    }

    /// Current members of `room`, ascending by id.
    pub fn members(&self, room: &RoomName) -> Vec<ConnectionId> {
        self.rooms.get(room).map(|r| r.ids()).unwrap_or_default()
    }

    pub fn contains_room(&self, room: &RoomName) -> bool {
        self.rooms.contains_key(room)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Must be called with the room's guard held.
    fn broadcast_peers(&self, room: &RoomName, members: &Room) {
        let ids = members.ids();
        let msg = SignalMessage::Peers {
            room: room.clone(),
            count: ids.len(),
            ids: ids.clone(),
        };
        self.registry.broadcast(&ids, &msg, None);
        debug!("room={} peers: {:?}", room, ids);
    }
}
