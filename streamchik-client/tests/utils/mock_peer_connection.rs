use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use streamchik_client::{
    NegotiationError, PeerConnection, SdpType, SessionDescription, SignalingState,
};
use tokio::sync::Notify;

/// What the mock has been told so far.
#[derive(Debug, Clone, Default)]
pub struct MockState {
    pub state: SignalingState,
    pub local: Option<SessionDescription>,
    pub remote: Option<SessionDescription>,
    pub offers_created: usize,
    /// Remote offers this side produced an answer for.
    pub answered: Vec<String>,
    pub candidates: Vec<Value>,
    pub closed: bool,
}

/// Peer connection that enforces offer/answer state transitions like a real
/// one, without any media or network.
pub struct MockPeerConnection {
    name: String,
    inner: Mutex<MockState>,
    offer_gate: Option<Arc<Notify>>,
}

impl MockPeerConnection {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            inner: Mutex::new(MockState::default()),
            offer_gate: None,
        })
    }

    /// `create_offer` blocks until `gate` is notified.
    pub fn gated(name: &str, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            inner: Mutex::new(MockState::default()),
            offer_gate: Some(gate),
        })
    }

    pub fn snapshot(&self) -> MockState {
        self.lock().clone()
    }

    /// Stable with both descriptions in place.
    pub fn is_settled(&self) -> bool {
        let s = self.lock();
        s.state == SignalingState::Stable && s.local.is_some() && s.remote.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap()
    }
}

fn invalid(kind: &'static str, state: SignalingState) -> NegotiationError {
    NegotiationError::InvalidState { kind, state }
}

#[async_trait]
impl PeerConnection for MockPeerConnection {
    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError> {
        if let Some(gate) = &self.offer_gate {
            gate.notified().await;
        }
        let mut s = self.lock();
        s.offers_created += 1;
        Ok(SessionDescription::offer(format!(
            "{}-offer-{}",
            self.name, s.offers_created
        )))
    }

    async fn create_answer(&self) -> Result<SessionDescription, NegotiationError> {
        let s = self.lock();
        match (&s.state, &s.remote) {
            (SignalingState::HaveRemoteOffer, Some(remote)) => Ok(SessionDescription::answer(
                format!("{}-answer-to-{}", self.name, remote.sdp),
            )),
            _ => Err(invalid("answer", s.state)),
        }
    }

    async fn set_local_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError> {
        let mut s = self.lock();
        let next = match (s.state, desc.kind) {
            (SignalingState::Stable, SdpType::Offer) => SignalingState::HaveLocalOffer,
            (SignalingState::HaveLocalOffer, SdpType::Rollback) => SignalingState::Stable,
            (SignalingState::HaveRemoteOffer, SdpType::Answer) => SignalingState::Stable,
            (state, _) => return Err(invalid("local description", state)),
        };

        if desc.kind == SdpType::Answer {
            if let Some(remote) = s.remote.clone() {
                s.answered.push(remote.sdp);
            }
        }
        s.local = (desc.kind != SdpType::Rollback).then_some(desc);
        s.state = next;
        Ok(())
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError> {
        let mut s = self.lock();
        let next = match (s.state, desc.kind) {
            (SignalingState::Stable, SdpType::Offer) => SignalingState::HaveRemoteOffer,
            (SignalingState::HaveLocalOffer, SdpType::Answer) => SignalingState::Stable,
            (state, _) => return Err(invalid("remote description", state)),
        };
        s.remote = Some(desc);
        s.state = next;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: Value) -> Result<(), NegotiationError> {
        let mut s = self.lock();
        if s.remote.is_none() {
            return Err(NegotiationError::peer(
                "add candidate",
                "no remote description",
            ));
        }
        s.candidates.push(candidate);
        Ok(())
    }

    async fn close(&self) {
        self.lock().closed = true;
    }
}
