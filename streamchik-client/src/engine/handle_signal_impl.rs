use crate::engine::{ClientEvent, SignalingClient};
use crate::peer_connection::SessionDescription;
use std::time::{SystemTime, UNIX_EPOCH};
use streamchik_core::{FrameError, Relayed, SignalMessage};
use tracing::{debug, info, warn};

impl SignalingClient {
    pub(super) async fn handle_signal(&mut self, text: &str) {
        let msg = match SignalMessage::parse(text) {
            Ok(msg) => msg,
            Err(FrameError::UnknownType(kind)) => {
                debug!("Ignoring unknown message type '{}'", kind);
                return;
            }
            Err(e) => {
                warn!("Bad frame from server: {}", e);
                return;
            }
        };

        match msg {
            SignalMessage::Ping { ts } => {
                let skew = unix_millis() as i64 - ts as i64;
                debug!("ping ts={} skew={}ms", ts, skew);
                self.send(SignalMessage::Pong { ts: Some(ts.into()) });
            }

            SignalMessage::Welcome { room, id } => {
                info!("Joined room '{}' as {}", room, id);
                self.local_id = Some(id);
                self.emit(ClientEvent::Welcome { room, id });
            }

            SignalMessage::Peers { room, count, ids } => {
                debug!("room={} peers: {:?}", room, ids);
                self.emit(ClientEvent::Peers { room, count, ids });
            }

            SignalMessage::Offer(body) => self.on_offer(body).await,
            SignalMessage::Answer(body) => self.on_answer(body).await,
            SignalMessage::Ice(body) => self.on_ice(body).await,

            SignalMessage::State(body) => match body.screen() {
                Some(screen) => {
                    info!("Remote screen {} from {:?}", screen.as_str(), body.from);
                    self.emit(ClientEvent::RemoteScreen {
                        from: body.from,
                        screen,
                    });
                }
                None => warn!("State message without a screen flag"),
            },

            other => debug!("Ignoring {} from server", other.kind()),
        }
    }

    async fn on_offer(&mut self, body: Relayed) {
        let Some(from) = body.from else {
            warn!("Offer without sender, dropping");
            return;
        };

        let offer = match SessionDescription::from_relayed(&body) {
            Ok(offer) => offer,
            Err(e) => return self.fail(e),
        };

        let Some(session) = self.ensure_session() else {
            return;
        };

        match session.handle_offer(from, offer).await {
            Ok(_) => self.report(&session),
            Err(e) => self.fail(e),
        }
    }

    async fn on_answer(&mut self, body: Relayed) {
        let Some(session) = self.session.clone() else {
            debug!("Answer without a peer session, dropping");
            return;
        };

        let answer = match SessionDescription::from_relayed(&body) {
            Ok(answer) => answer,
            Err(e) => return self.fail(e),
        };

        match session.handle_answer(answer).await {
            Ok(()) => self.report(&session),
            Err(e) => self.fail(e),
        }
    }

    async fn on_ice(&mut self, body: Relayed) {
        let (Some(session), Some(candidate)) = (self.session.clone(), body.candidate().cloned())
        else {
            return;
        };

        if let Err(e) = session.handle_ice(candidate).await {
            warn!("Failed to add ICE candidate: {}", e);
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
