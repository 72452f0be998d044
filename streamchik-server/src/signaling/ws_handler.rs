use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, addr, state))
}

async fn handle_socket(socket: WebSocket, addr: SocketAddr, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let id = state.registry.register(tx);
    let termination = state.registry.termination(id).unwrap_or_default();
    info!("Client connected {} from {}", id, addr);

    state.rooms.join(id, state.default_room());

    let mut send_task = tokio::spawn(async move {
        let write = async {
            while let Some(text) = rx.recv().await {
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        };

        // a peer that stopped reading can park `write` on a full buffer
        tokio::select! {
            _ = write => {}
            _ = termination.notified() => debug!("Terminating transport {}", id),
        }
    });

    let mut recv_task = tokio::spawn({
        let router = state.router.clone();

        async move {
            while let Some(msg) = receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => router.handle_frame(id, text.as_str()),
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Error on {}: {}", id, e);
                        break;
                    }
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            // the reader may be mid-frame; it must not touch rooms after we leave
            let _ = recv_task.await;
        }
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.disconnect(id);
}
