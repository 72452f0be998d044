use crate::room::RoomDirectory;
use crate::transport::ConnectionRegistry;
use std::sync::Arc;
use streamchik_core::{ConnectionId, FrameError, RoomName, SignalMessage};
use tracing::{debug, warn};

/// Validates inbound frames and dispatches them by type.
///
/// Nothing a client sends can fail its own connection: bad frames are
/// logged and dropped.
pub struct MessageRouter {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomDirectory>,
    default_room: RoomName,
}

impl MessageRouter {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomDirectory>,
        default_room: RoomName,
    ) -> Self {
        Self {
            registry,
            rooms,
            default_room,
        }
    }

    pub fn default_room(&self) -> &RoomName {
        &self.default_room
    }

    /// Handles one text frame received from `from`.
    pub fn handle_frame(&self, from: ConnectionId, text: &str) {
        match SignalMessage::parse(text) {
            Ok(msg) => self.dispatch(from, msg),
            Err(FrameError::UnknownType(kind)) => {
                warn!("Unknown message type from {}: {}", from, kind);
            }
            Err(e) => warn!("Bad frame from {}: {} ({:?})", from, e, text),
        }
    }

    pub fn dispatch(&self, from: ConnectionId, msg: SignalMessage) {
        debug!("{} -> {}", from, msg.kind());

        match msg {
            SignalMessage::Join { room } => {
                let target = self.resolve_room(room.as_deref());
                if self.registry.current_room(from).as_ref() != Some(&target) {
                    self.rooms.join(from, target);
                }
            }

            SignalMessage::Offer(_)
            | SignalMessage::Answer(_)
            | SignalMessage::Ice(_)
            | SignalMessage::State(_) => self.relay(from, msg),

            SignalMessage::Pong { .. } => self.registry.touch(from),

            other => warn!("Unexpected {} message from {}, dropping", other.kind(), from),
        }
    }

    /// Trimmed requested name, or the default room when absent or blank.
    pub fn resolve_room(&self, requested: Option<&str>) -> RoomName {
        match requested.map(str::trim) {
            Some(name) if !name.is_empty() => RoomName::from(name),
            _ => self.default_room.clone(),
        }
    }

    fn relay(&self, from: ConnectionId, mut msg: SignalMessage) {
        let Some(room) = self.registry.current_room(from) else {
            debug!("{} is not in a room, dropping {}", from, msg.kind());
            return;
        };

        if let Some(body) = msg.relayed_mut() {
            body.stamp(from, room.clone());
        }

        let members = self.rooms.members(&room);
        self.registry.broadcast(&members, &msg, Some(from));
    }
}
