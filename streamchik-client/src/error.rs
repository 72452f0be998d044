use crate::negotiation::SignalingState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NegotiationError {
    /// The underlying peer connection refused an operation.
    #[error("peer connection failed to {operation}: {reason}")]
    PeerConnection {
        operation: &'static str,
        reason: String,
    },

    #[error("cannot apply {kind} in state {state:?}")]
    InvalidState {
        kind: &'static str,
        state: SignalingState,
    },

    #[error("malformed session description: {0}")]
    Description(#[from] serde_json::Error),

    #[error("signaling channel closed")]
    ChannelClosed,
}

impl NegotiationError {
    pub fn peer(operation: &'static str, reason: impl ToString) -> Self {
        Self::PeerConnection {
            operation,
            reason: reason.to_string(),
        }
    }
}
