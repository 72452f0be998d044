mod peer_session;

pub use peer_session::{OfferOutcome, PeerSession};

use streamchik_core::ConnectionId;

/// Offer/answer progress of one peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalingState {
    #[default]
    Stable,
    HaveLocalOffer,
    HaveRemoteOffer,
}

/// Which side yields when both peers offer at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Politeness {
    /// Rolls back its own offer and answers the remote one.
    Polite,
    /// Ignores colliding remote offers.
    Impolite,
}

impl Politeness {
    /// The side with the lower server-assigned id is polite.
    ///
    /// Symmetric: for two distinct ids exactly one side gets `Polite`.
    pub fn between(local: ConnectionId, remote: ConnectionId) -> Self {
        if local < remote {
            Politeness::Polite
        } else {
            Politeness::Impolite
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferAction {
    /// Drop the offer entirely: no rollback, no answer.
    Ignore,
    /// Apply the offer, undoing our own pending offer first when `rollback`.
    Accept { rollback: bool },
}

/// Glare-resolution bookkeeping. No I/O happens here; [`PeerSession`] feeds
/// it events and performs whatever the returned decisions call for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Negotiation {
    pub state: SignalingState,
    pub making_offer: bool,
    pub ignore_offer: bool,
}

impl Negotiation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_negotiating(&self) -> bool {
        self.making_offer || self.state != SignalingState::Stable
    }

    /// Starts a local offer unless one is already under way.
    pub fn begin_offer(&mut self) -> bool {
        if self.is_negotiating() {
            return false;
        }
        self.making_offer = true;
        true
    }

    /// A freshly created local offer may only be applied if nothing moved
    /// the session out of `stable` while it was being produced.
    pub fn can_apply_local_offer(&self) -> bool {
        self.making_offer && self.state == SignalingState::Stable
    }

    pub fn local_offer_applied(&mut self) {
        self.state = SignalingState::HaveLocalOffer;
    }

    pub fn finish_offer(&mut self) {
        self.making_offer = false;
    }

    /// Decides what to do with an incoming remote offer.
    pub fn on_remote_offer(&mut self, politeness: Politeness) -> OfferAction {
        let collision = self.is_negotiating();
        self.ignore_offer = collision && politeness == Politeness::Impolite;

        if self.ignore_offer {
            OfferAction::Ignore
        } else {
            // only a description that was actually applied can be rolled back
            OfferAction::Accept {
                rollback: collision && self.state == SignalingState::HaveLocalOffer,
            }
        }
    }

    pub fn rolled_back(&mut self) {
        self.state = SignalingState::Stable;
    }

    pub fn remote_offer_applied(&mut self) {
        self.state = SignalingState::HaveRemoteOffer;
    }

    pub fn local_answer_applied(&mut self) {
        self.state = SignalingState::Stable;
    }

    /// Remote answers are only meaningful while our offer is outstanding.
    pub fn accepts_remote_answer(&self) -> bool {
        self.state == SignalingState::HaveLocalOffer
    }

    pub fn remote_answer_applied(&mut self) {
        self.state = SignalingState::Stable;
    }

    /// Candidate failures are expected noise after an ignored offer.
    pub fn suppresses_candidate_errors(&self) -> bool {
        self.ignore_offer
    }
}
