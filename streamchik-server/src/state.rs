use crate::config::ServerConfig;
use crate::room::RoomDirectory;
use crate::signaling::MessageRouter;
use crate::transport::ConnectionRegistry;
use std::sync::Arc;
use streamchik_core::{ConnectionId, RoomName};
use tracing::info;

/// Shared server state handed to every socket task.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
    pub rooms: Arc<RoomDirectory>,
    pub router: Arc<MessageRouter>,
}

impl AppState {
    pub fn new(default_room: RoomName) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomDirectory::new(registry.clone()));
        let router = Arc::new(MessageRouter::new(
            registry.clone(),
            rooms.clone(),
            default_room,
        ));

        Self {
            registry,
            rooms,
            router,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.default_room())
    }

    pub fn default_room(&self) -> RoomName {
        self.router.default_room().clone()
    }

    /// Close handling: leave the room (broadcasting the new member list)
    /// and forget the connection, in one step.
    pub fn disconnect(&self, id: ConnectionId) {
        self.rooms.leave(id);
        self.registry.unregister(id);
        info!("Client disconnected {}", id);
    }
}
