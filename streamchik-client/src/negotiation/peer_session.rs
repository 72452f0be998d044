use crate::error::NegotiationError;
use crate::negotiation::{Negotiation, OfferAction, Politeness, SignalingState};
use crate::peer_connection::{PeerConnection, SessionDescription};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use streamchik_core::{ConnectionId, Relayed, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    Answered,
    /// Dropped as the impolite side of a collision.
    Ignored,
}

/// One negotiated peer connection with a single remote peer.
///
/// Every method takes `&self` so an incoming offer can be evaluated while a
/// local offer is still being produced. The negotiation flags are only
/// locked between awaits, never across them.
pub struct PeerSession {
    local_id: ConnectionId,
    pc: Arc<dyn PeerConnection>,
    negotiation: Mutex<Negotiation>,
    outbox: mpsc::UnboundedSender<SignalMessage>,
}

impl PeerSession {
    pub fn new(
        local_id: ConnectionId,
        pc: Arc<dyn PeerConnection>,
        outbox: mpsc::UnboundedSender<SignalMessage>,
    ) -> Self {
        Self {
            local_id,
            pc,
            negotiation: Mutex::new(Negotiation::new()),
            outbox,
        }
    }

    pub fn local_id(&self) -> ConnectionId {
        self.local_id
    }

    pub fn negotiation(&self) -> Negotiation {
        *self.lock()
    }

    pub fn state(&self) -> SignalingState {
        self.lock().state
    }

    fn lock(&self) -> MutexGuard<'_, Negotiation> {
        self.negotiation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn send(&self, msg: SignalMessage) -> Result<(), NegotiationError> {
        self.outbox
            .send(msg)
            .map_err(|_| NegotiationError::ChannelClosed)
    }

    /// Produces and sends a local offer. Returns `false` when nothing was
    /// sent, either because negotiation is already under way or because a
    /// remote offer took over while ours was being created.
    pub async fn negotiation_needed(&self) -> Result<bool, NegotiationError> {
        if !self.lock().begin_offer() {
            debug!("Negotiation already in progress, not offering");
            return Ok(false);
        }

        let result = self.make_offer().await;
        self.lock().finish_offer();
        result
    }

    async fn make_offer(&self) -> Result<bool, NegotiationError> {
        let offer = self.pc.create_offer().await?;

        if !self.lock().can_apply_local_offer() {
            info!("Local offer superseded by a remote offer, discarding");
            return Ok(false);
        }

        self.pc.set_local_description(offer.clone()).await?;
        self.lock().local_offer_applied();

        self.send(SignalMessage::Offer(offer.to_relayed()?))?;
        debug!("{} sent offer", self.local_id);
        Ok(true)
    }

    /// Applies a remote offer from `from` and answers it, unless we are the
    /// impolite side of a collision.
    pub async fn handle_offer(
        &self,
        from: ConnectionId,
        offer: SessionDescription,
    ) -> Result<OfferOutcome, NegotiationError> {
        let politeness = Politeness::between(self.local_id, from);
        let action = self.lock().on_remote_offer(politeness);

        let rollback = match action {
            OfferAction::Ignore => {
                info!("Offer collision with {}, ignoring their offer", from);
                return Ok(OfferOutcome::Ignored);
            }
            OfferAction::Accept { rollback } => rollback,
        };

        if rollback {
            info!("Offer collision with {}, rolling back ours", from);
            let (rolled_back, applied) = tokio::join!(
                self.pc.set_local_description(SessionDescription::rollback()),
                self.pc.set_remote_description(offer),
            );
            rolled_back?;
            self.lock().rolled_back();
            applied?;
        } else {
            self.pc.set_remote_description(offer).await?;
        }
        self.lock().remote_offer_applied();

        let answer = self.pc.create_answer().await?;
        self.pc.set_local_description(answer.clone()).await?;
        self.lock().local_answer_applied();

        self.send(SignalMessage::Answer(answer.to_relayed()?))?;
        debug!("{} answered offer from {}", self.local_id, from);
        Ok(OfferOutcome::Answered)
    }

    pub async fn handle_answer(&self, answer: SessionDescription) -> Result<(), NegotiationError> {
        let negotiation = self.negotiation();
        if !negotiation.accepts_remote_answer() {
            return Err(NegotiationError::InvalidState {
                kind: "answer",
                state: negotiation.state,
            });
        }

        self.pc.set_remote_description(answer).await?;
        self.lock().remote_answer_applied();
        Ok(())
    }

    /// Applies a remote candidate. Failures right after an ignored offer
    /// are expected and swallowed.
    pub async fn handle_ice(&self, candidate: Value) -> Result<(), NegotiationError> {
        match self.pc.add_ice_candidate(candidate).await {
            Ok(()) => Ok(()),
            Err(e) if self.lock().suppresses_candidate_errors() => {
                debug!("Dropping candidate for ignored offer: {}", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Relays a candidate gathered by the local peer connection.
    pub fn send_candidate(&self, candidate: Value) -> Result<(), NegotiationError> {
        self.send(SignalMessage::Ice(Relayed::with_field("candidate", candidate)))
    }

    pub async fn close(&self) {
        self.pc.close().await;
    }
}
