use crate::engine::{ClientCommand, SignalingClient};
use serde_json::Value;
use streamchik_core::{Relayed, SignalMessage};
use tracing::{debug, info};

impl SignalingClient {
    pub(super) async fn handle_command(&mut self, command: ClientCommand) {
        match command {
            ClientCommand::NegotiationNeeded => {
                let Some(session) = self.ensure_session() else {
                    return;
                };
                match session.negotiation_needed().await {
                    Ok(true) => self.report(&session),
                    Ok(false) => {}
                    Err(e) => self.fail(e),
                }
            }

            ClientCommand::ScreenState(screen) => {
                info!("Local screen {}", screen.as_str());
                self.send(SignalMessage::State(Relayed::with_field(
                    "screen",
                    Value::from(screen.as_str()),
                )));
            }

            ClientCommand::LocalCandidate(candidate) => match &self.session {
                Some(session) => {
                    if let Err(e) = session.send_candidate(candidate) {
                        self.fail(e);
                    }
                }
                None => debug!("No peer session, dropping local candidate"),
            },

            ClientCommand::Hangup => {
                self.end_session().await;
                info!("Call ended");
            }

            // handled by the connection loop
            ClientCommand::Shutdown => debug!("Shutdown requested"),
        }
    }
}
