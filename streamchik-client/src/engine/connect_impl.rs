use crate::engine::{ClientCommand, ClientEvent, SignalingClient};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use streamchik_core::SignalMessage;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum Disconnect {
    Lost,
    Shutdown,
}

impl SignalingClient {
    pub(super) async fn run(mut self, mut commands: mpsc::UnboundedReceiver<ClientCommand>) {
        loop {
            info!("Connecting to {}", self.config.signaling_url);

            match connect_async(self.config.signaling_url.as_str()).await {
                Ok((ws, _)) => {
                    let outcome = self.drive(ws, &mut commands).await;
                    self.reset().await;
                    self.emit(ClientEvent::Disconnected);

                    if let Disconnect::Shutdown = outcome {
                        info!("Signaling client stopped");
                        return;
                    }
                }
                Err(e) => warn!("Signaling connection failed: {}", e),
            }

            if !self.wait_reconnect(&mut commands).await {
                info!("Signaling client stopped");
                return;
            }
        }
    }

    /// Sleeps out the reconnect delay. Returns `false` if asked to stop.
    async fn wait_reconnect(&self, commands: &mut mpsc::UnboundedReceiver<ClientCommand>) -> bool {
        debug!("Reconnecting in {:?}", self.config.reconnect_delay);

        let delay = tokio::time::sleep(self.config.reconnect_delay);
        tokio::pin!(delay);

        loop {
            tokio::select! {
                _ = &mut delay => return true,
                command = commands.recv() => match command {
                    None | Some(ClientCommand::Shutdown) => return false,
                    Some(command) => debug!("Not connected, dropping {:?}", command),
                },
            }
        }
    }

    async fn drive(
        &mut self,
        ws: WsStream,
        commands: &mut mpsc::UnboundedReceiver<ClientCommand>,
    ) -> Disconnect {
        let (mut sink, mut stream) = ws.split();
        let (outbox_tx, mut outbox) = mpsc::unbounded_channel();
        self.outbox = Some(outbox_tx);

        info!("Connected to {}", self.config.signaling_url);
        self.emit(ClientEvent::Connected);
        self.send(SignalMessage::Join {
            room: Some(self.config.room.to_string()),
        });

        loop {
            tokio::select! {
                Some(msg) = outbox.recv() => {
                    if let Err(e) = self.write(&mut sink, msg).await {
                        warn!("Signaling send failed: {}", e);
                        return Disconnect::Lost;
                    }
                }
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_signal(text.as_str()).await,
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Signaling connection closed");
                        return Disconnect::Lost;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Signaling transport error: {}", e);
                        return Disconnect::Lost;
                    }
                },
                command = commands.recv() => match command {
                    None | Some(ClientCommand::Shutdown) => {
                        let _ = sink.close().await;
                        return Disconnect::Shutdown;
                    }
                    Some(command) => self.handle_command(command).await,
                },
            }
        }
    }

    async fn write(
        &self,
        sink: &mut SplitSink<WsStream, Message>,
        mut msg: SignalMessage,
    ) -> Result<(), tungstenite::Error> {
        if let Some(body) = msg.relayed_mut() {
            body.room.get_or_insert_with(|| self.config.room.clone());
        }

        match msg.to_json() {
            Ok(json) => sink.send(Message::text(json)).await,
            Err(e) => {
                error!("Failed to serialize {} message: {}", msg.kind(), e);
                Ok(())
            }
        }
    }

    /// Everything tied to the dropped transport goes with it.
    async fn reset(&mut self) {
        self.end_session().await;
        self.outbox = None;
        self.local_id = None;
    }
}
