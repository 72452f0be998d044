use std::env;
use std::time::Duration;
use streamchik_core::RoomName;

pub const DEFAULT_SIGNALING_URL: &str = "ws://localhost:8080";
pub const DEFAULT_ROOM: &str = "room-1";
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub signaling_url: String,
    pub room: RoomName,
    /// Fixed pause between reconnect attempts. Attempts are unbounded.
    pub reconnect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            signaling_url: DEFAULT_SIGNALING_URL.to_string(),
            room: RoomName::from(DEFAULT_ROOM),
            reconnect_delay: RECONNECT_DELAY,
        }
    }
}

impl ClientConfig {
    /// Reads `SIGNALING_URL` and `SIGNALING_ROOM`, falling back to defaults.
    pub fn from_env() -> Self {
        let signaling_url = env::var("SIGNALING_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SIGNALING_URL.to_string());

        let room = env::var("SIGNALING_ROOM")
            .ok()
            .map(|room| room.trim().to_string())
            .filter(|room| !room.is_empty())
            .unwrap_or_else(|| DEFAULT_ROOM.to_string());

        Self {
            signaling_url,
            room: RoomName::from(room),
            ..Default::default()
        }
    }
}
