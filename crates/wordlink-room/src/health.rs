//! Background sweep that evicts idle and empty rooms.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use wordlink_protocol::RoomCode;

use crate::RoomRegistry;

/// Periodically sweeps a [`RoomRegistry`].
pub struct HealthMonitor {
    registry: Arc<RoomRegistry>,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(registry: Arc<RoomRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Uses the registry's configured sweep interval.
    pub fn from_registry(registry: Arc<RoomRegistry>) -> Self {
        let interval = registry.config().sweep_interval;
        Self::new(registry, interval)
    }

    /// Runs one sweep now and returns the evicted codes.
    pub async fn sweep_once(&self) -> Vec<RoomCode> {
        let started = Instant::now();
        let evicted = self.registry.sweep(started).await;
        if evicted.is_empty() {
            tracing::trace!("health sweep: nothing to evict");
        } else {
            tracing::info!(
                evicted = evicted.len(),
                rooms = ?evicted,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "health sweep evicted rooms"
            );
        }
        evicted
    }

    /// Starts sweeping on a background task. The first sweep happens one
    /// interval from now.
    pub fn spawn(self) -> HealthMonitorHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let interval_ms = self.interval.as_millis() as u64;
            tracing::debug!(interval_ms, "health monitor started");

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        self.sweep_once().await;
                    }
                }
            }

            tracing::debug!("health monitor stopped");
        });

        HealthMonitorHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

/// Stops a spawned [`HealthMonitor`].
pub struct HealthMonitorHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl HealthMonitorHandle {
    /// Signals the monitor and waits for it to finish its current sweep.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::warn!(error = %e, "health monitor task failed");
        }
    }
}

impl Drop for HealthMonitorHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
