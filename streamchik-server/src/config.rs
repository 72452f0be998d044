use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use streamchik_core::RoomName;

pub const DEFAULT_ROOM: &str = "room-1";

/// Relay server settings. Every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "streamchik-server", about = "WebSocket signaling relay for streamchik")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "SIGNALING_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "SIGNALING_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Room a connection lands in until it asks for another one.
    #[arg(long, env = "SIGNALING_ROOM", default_value = DEFAULT_ROOM)]
    pub default_room: String,

    /// Seconds between heartbeat probes.
    #[arg(long, env = "HEARTBEAT_INTERVAL_SECS", default_value_t = 30)]
    pub heartbeat_interval_secs: u64,

    /// Seconds without a pong before a connection is terminated.
    #[arg(long, env = "HEARTBEAT_TIMEOUT_SECS", default_value_t = 90)]
    pub heartbeat_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            default_room: DEFAULT_ROOM.to_string(),
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Configured default room, trimmed. Blank falls back to `room-1`.
    pub fn default_room(&self) -> RoomName {
        match self.default_room.trim() {
            "" => RoomName::from(DEFAULT_ROOM),
            name => RoomName::from(name),
        }
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout_secs)
    }
}
