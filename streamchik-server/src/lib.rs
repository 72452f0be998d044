//! Streamchik signaling relay.
//!
//! Pairs peers for a direct media session by relaying their negotiation
//! messages inside named rooms. Media never passes through here.
//!
//! ```text
//! socket ─► ConnectionRegistry ─► RoomDirectory
//!              ▲      │                ▲
//!              │      ▼                │
//!   LivenessMonitor  MessageRouter ────┘
//! ```

pub mod config;
pub mod liveness;
pub mod room;
pub mod server;
pub mod signaling;
pub mod state;
pub mod transport;

pub use config::ServerConfig;
pub use liveness::LivenessMonitor;
pub use room::{Room, RoomDirectory};
pub use server::{app, bind_exit_code, serve};
pub use signaling::{MessageRouter, ws_handler};
pub use state::AppState;
pub use transport::{Connection, ConnectionRegistry};
