use crate::config::ClientConfig;
use crate::error::NegotiationError;
use crate::negotiation::{PeerSession, SignalingState};
use crate::peer_connection::PeerConnection;
use serde_json::Value;
use std::sync::Arc;
use streamchik_core::{ConnectionId, RoomName, ScreenState, SignalMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

mod connect_impl;
mod handle_command_impl;
mod handle_signal_impl;

/// Builds a fresh peer connection whenever a new session starts.
pub type PeerConnectionFactory = Arc<dyn Fn() -> Arc<dyn PeerConnection> + Send + Sync>;

/// Requests from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// Local media changed and needs (re)negotiation.
    NegotiationNeeded,
    /// Announce local capture start/stop to the room.
    ScreenState(ScreenState),
    /// Candidate gathered by the local peer connection.
    LocalCandidate(Value),
    Hangup,
    Shutdown,
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Connected,
    Disconnected,
    Welcome {
        room: RoomName,
        id: ConnectionId,
    },
    Peers {
        room: RoomName,
        count: usize,
        ids: Vec<ConnectionId>,
    },
    RemoteScreen {
        from: Option<ConnectionId>,
        screen: ScreenState,
    },
    Negotiation(SignalingState),
    NegotiationFailed(String),
}

#[derive(Clone)]
pub struct ClientHandle {
    commands: mpsc::UnboundedSender<ClientCommand>,
}

impl ClientHandle {
    /// Returns `false` once the client task has stopped.
    pub fn send(&self, command: ClientCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn negotiation_needed(&self) -> bool {
        self.send(ClientCommand::NegotiationNeeded)
    }

    pub fn set_screen(&self, screen: ScreenState) -> bool {
        self.send(ClientCommand::ScreenState(screen))
    }

    pub fn hangup(&self) -> bool {
        self.send(ClientCommand::Hangup)
    }

    pub fn shutdown(&self) -> bool {
        self.send(ClientCommand::Shutdown)
    }
}

/// Keeps one signaling connection alive and drives the peer session over it.
///
/// Runs as a single task: inbound frames and commands are handled one at a
/// time in arrival order. The session and the server-assigned id live only
/// as long as the transport that produced them.
pub struct SignalingClient {
    config: ClientConfig,
    factory: PeerConnectionFactory,
    events: mpsc::UnboundedSender<ClientEvent>,
    local_id: Option<ConnectionId>,
    session: Option<Arc<PeerSession>>,
    outbox: Option<mpsc::UnboundedSender<SignalMessage>>,
}

impl SignalingClient {
    pub fn new(
        config: ClientConfig,
        factory: PeerConnectionFactory,
        events: mpsc::UnboundedSender<ClientEvent>,
    ) -> Self {
        Self {
            config,
            factory,
            events,
            local_id: None,
            session: None,
            outbox: None,
        }
    }

    /// Starts the client on the current runtime.
    pub fn spawn(
        config: ClientConfig,
        factory: PeerConnectionFactory,
    ) -> (
        ClientHandle,
        mpsc::UnboundedReceiver<ClientEvent>,
        JoinHandle<()>,
    ) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let client = Self::new(config, factory, events_tx);
        let task = tokio::spawn(client.run(commands_rx));

        (
            ClientHandle {
                commands: commands_tx,
            },
            events_rx,
            task,
        )
    }

    fn emit(&self, event: ClientEvent) {
        if self.events.send(event).is_err() {
            debug!("No event listener");
        }
    }

    /// Queues a frame for the current transport.
    fn send(&self, msg: SignalMessage) {
        match &self.outbox {
            Some(outbox) => {
                let _ = outbox.send(msg);
            }
            None => debug!("Not connected, dropping {}", msg.kind()),
        }
    }

    fn ensure_session(&mut self) -> Option<Arc<PeerSession>> {
        if let Some(session) = &self.session {
            return Some(session.clone());
        }

        let (Some(local_id), Some(outbox)) = (self.local_id, self.outbox.clone()) else {
            warn!("No id assigned by the server yet, cannot negotiate");
            return None;
        };

        let session = Arc::new(PeerSession::new(local_id, (self.factory)(), outbox));
        debug!("Peer session created as {}", local_id);
        self.session = Some(session.clone());
        Some(session)
    }

    async fn end_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
            debug!("Peer session closed");
        }
    }

    fn report(&self, session: &PeerSession) {
        self.emit(ClientEvent::Negotiation(session.state()));
    }

    fn fail(&self, e: NegotiationError) {
        warn!("Negotiation failed: {}", e);
        self.emit(ClientEvent::NegotiationFailed(e.to_string()));
    }
}
