use crate::error::NegotiationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use streamchik_core::Relayed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
    Rollback,
}

/// Session description as produced by the peer connection. The `sdp` text
/// is never inspected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpType,
    #[serde(default)]
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpType::Answer,
            sdp: sdp.into(),
        }
    }

    pub fn rollback() -> Self {
        Self {
            kind: SdpType::Rollback,
            sdp: String::new(),
        }
    }

    /// Reads the `sdp` field of a relayed offer/answer.
    pub fn from_relayed(body: &Relayed) -> Result<Self, NegotiationError> {
        let raw = body.sdp().cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(raw)?)
    }

    pub fn to_relayed(&self) -> Result<Relayed, NegotiationError> {
        Ok(Relayed::with_field("sdp", serde_json::to_value(self)?))
    }
}

/// ICE/STUN-backed peer connection primitive, provided by the embedding
/// application.
///
/// Calls arrive in the order the negotiation state machine dictates;
/// descriptions and candidates are relayed verbatim.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError>;

    async fn create_answer(&self) -> Result<SessionDescription, NegotiationError>;

    /// Also receives [`SessionDescription::rollback`].
    async fn set_local_description(&self, desc: SessionDescription)
    -> Result<(), NegotiationError>;

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError>;

    async fn add_ice_candidate(&self, candidate: Value) -> Result<(), NegotiationError>;

    /// Releases tracks and transports. Called when the session ends.
    async fn close(&self) {}
}
