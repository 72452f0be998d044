use crate::utils::MockPeerConnection;
use std::sync::Arc;
use streamchik_client::{PeerSession, SessionDescription};
use streamchik_core::{ConnectionId, SignalMessage};
use tokio::sync::{Notify, mpsc};

/// A peer session wired to a mock, with its outgoing messages captured.
pub struct TestPeer {
    pub id: ConnectionId,
    pub session: Arc<PeerSession>,
    pub pc: Arc<MockPeerConnection>,
    pub outbox: mpsc::UnboundedReceiver<SignalMessage>,
}

impl TestPeer {
    pub fn new(id: u64) -> Self {
        Self::with_pc(id, MockPeerConnection::new(&format!("c{}", id)))
    }

    pub fn gated(id: u64, gate: Arc<Notify>) -> Self {
        Self::with_pc(id, MockPeerConnection::gated(&format!("c{}", id), gate))
    }

    fn with_pc(id: u64, pc: Arc<MockPeerConnection>) -> Self {
        let (tx, outbox) = mpsc::unbounded_channel();
        let id = ConnectionId(id);
        Self {
            id,
            session: Arc::new(PeerSession::new(id, pc.clone(), tx)),
            pc,
            outbox,
        }
    }

    pub fn take(&mut self) -> SignalMessage {
        self.outbox
            .try_recv()
            .expect("expected an outgoing message")
    }

    pub fn take_offer(&mut self) -> SessionDescription {
        match self.take() {
            SignalMessage::Offer(body) => SessionDescription::from_relayed(&body).unwrap(),
            other => panic!("expected offer, got {:?}", other),
        }
    }

    pub fn take_answer(&mut self) -> SessionDescription {
        match self.take() {
            SignalMessage::Answer(body) => SessionDescription::from_relayed(&body).unwrap(),
            other => panic!("expected answer, got {:?}", other),
        }
    }

    pub fn assert_quiet(&mut self) {
        if let Ok(msg) = self.outbox.try_recv() {
            panic!("{} sent unexpected {:?}", self.id, msg);
        }
    }
}
