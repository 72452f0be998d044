//! Desktop side of streamchik signaling.
//!
//! Drives offer/answer/ICE exchange with one remote peer through the relay
//! server and resolves simultaneous offers with the polite/impolite rule.
//! Capture, devices and the actual peer connection live outside this crate
//! and are reached through [`PeerConnection`] and the command/event channels
//! of [`SignalingClient`].

pub mod config;
pub mod engine;
pub mod error;
pub mod negotiation;
pub mod peer_connection;

pub use config::ClientConfig;
pub use engine::{ClientCommand, ClientEvent, ClientHandle, PeerConnectionFactory, SignalingClient};
pub use error::NegotiationError;
pub use negotiation::{
    Negotiation, OfferAction, OfferOutcome, PeerSession, Politeness, SignalingState,
};
pub use peer_connection::{PeerConnection, SdpType, SessionDescription};
