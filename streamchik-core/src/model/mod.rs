mod connection;
mod room;
mod signaling;

pub use connection::{ConnectionId, ParseConnectionIdError};
pub use room::RoomName;
pub use signaling::{FrameError, Relayed, ScreenState, SignalMessage};
