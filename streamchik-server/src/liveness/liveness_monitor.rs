use crate::transport::ConnectionRegistry;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use streamchik_core::SignalMessage;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(90);

/// Outcome of one monitor pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub pinged: usize,
    pub terminated: usize,
}

/// Periodic heartbeat probe.
///
/// Every `interval` each open connection either gets a `ping` or, when its
/// last `pong` is older than `timeout`, has its transport terminated. The
/// socket's close handling then takes it out of its room.
pub struct LivenessMonitor {
    registry: Arc<ConnectionRegistry>,
    interval: Duration,
    timeout: Duration,
}

impl LivenessMonitor {
    pub fn new(registry: Arc<ConnectionRegistry>, interval: Duration, timeout: Duration) -> Self {
        Self {
            registry,
            interval,
            timeout,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        info!(
            "Liveness monitor started (interval {:?}, timeout {:?})",
            self.interval, self.timeout
        );

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let report = self.sweep();
            debug!(
                pinged = report.pinged,
                terminated = report.terminated,
                "Heartbeat tick"
            );
        }
    }

    /// Runs one pass over all open connections.
    pub fn sweep(&self) -> SweepReport {
        let now = Instant::now();
        let mut report = SweepReport::default();

        for (id, last_heartbeat) in self.registry.heartbeats() {
            if now.duration_since(last_heartbeat) > self.timeout {
                if self.registry.terminate(id) {
                    warn!("Client {} timed out, terminating", id);
                    report.terminated += 1;
                }
                continue;
            }

            if self.registry.send(id, &SignalMessage::Ping { ts: unix_millis() }) {
                report.pinged += 1;
            }
        }

        report
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
