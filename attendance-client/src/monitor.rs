//! Connectivity monitor
//!
//! Watches the platform reachability signal and triggers a queue drain on
//! each offline→online transition. The platform bridge feeds the watch
//! channel; this loop runs until its cancellation token fires.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::engine::AttendanceSyncEngine;
use crate::queue::DrainOutcome;

/// Drives queue replay from connectivity changes
pub struct ConnectivityMonitor {
    engine: Arc<AttendanceSyncEngine>,
    connectivity: watch::Receiver<bool>,
    shutdown: CancellationToken,
}

impl ConnectivityMonitor {
    pub fn new(
        engine: Arc<AttendanceSyncEngine>,
        connectivity: watch::Receiver<bool>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            engine,
            connectivity,
            shutdown,
        }
    }

    /// Run the monitor loop
    ///
    /// Replays are attempted once per offline→online transition, and once
    /// at startup if the device is already online with entries pending.
    pub async fn run(self) {
        let Self {
            engine,
            mut connectivity,
            shutdown,
        } = self;

        tracing::info!("ConnectivityMonitor started");

        let mut was_connected = *connectivity.borrow();
        if was_connected && engine.pending_count() > 0 {
            Self::drain(&engine).await;
        }

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("ConnectivityMonitor shutting down");
                    break;
                }

                changed = connectivity.changed() => {
                    if changed.is_err() {
                        tracing::info!("Connectivity channel closed, monitor stopping");
                        break;
                    }

                    let connected = *connectivity.borrow_and_update();
                    if connected && !was_connected {
                        tracing::info!("Connectivity restored, draining offline queue");
                        Self::drain(&engine).await;
                    } else if !connected && was_connected {
                        tracing::info!("Connectivity lost");
                    }
                    was_connected = connected;
                }
            }
        }
    }

    async fn drain(engine: &AttendanceSyncEngine) {
        match engine.sync_now().await {
            Ok(DrainOutcome::Empty) => {}
            Ok(DrainOutcome::Replayed(event)) => {
                tracing::info!(action = %event.action, "Offline event synced");
            }
            Ok(DrainOutcome::Invalidated { dropped }) => {
                tracing::warn!(dropped, "Offline queue invalidated during sync");
            }
            Err(e) => {
                tracing::warn!("Offline queue drain failed: {e}");
            }
        }
    }
}
