use std::sync::Arc;
use streamchik_core::{ConnectionId, RoomName};
use tokio::sync::{Notify, mpsc};
use tokio::time::Instant;

/// Server-side record of one live transport connection.
///
/// Owned by the [`ConnectionRegistry`](crate::transport::ConnectionRegistry);
/// everything else refers to it by [`ConnectionId`].
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub room: Option<RoomName>,
    pub last_heartbeat: Instant,
    outbound: mpsc::UnboundedSender<String>,
    /// Fired at most once; the socket task drops the transport on it
    /// without draining queued frames.
    termination: Arc<Notify>,
    terminated: bool,
}

impl Connection {
    pub(crate) fn new(id: ConnectionId, outbound: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id,
            room: None,
            last_heartbeat: Instant::now(),
            outbound,
            termination: Arc::new(Notify::new()),
            terminated: false,
        }
    }

    /// The writer side is gone once the socket task has stopped.
    pub fn is_open(&self) -> bool {
        !self.outbound.is_closed()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub(crate) fn termination(&self) -> Arc<Notify> {
        self.termination.clone()
    }

    /// Returns `false` if termination was already requested.
    pub(crate) fn terminate(&mut self) -> bool {
        if self.terminated {
            return false;
        }
        self.terminated = true;
        // stores a permit if the socket task is not waiting yet
        self.termination.notify_one();
        true
    }

    pub(crate) fn push(&self, frame: String) -> bool {
        self.outbound.send(frame).is_ok()
    }
}
