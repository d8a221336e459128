//! Durable offline submission queue
//!
//! FIFO of attendance events that failed to submit, replayed when
//! connectivity returns. FIFO order is the queue's only ordering
//! invariant; entries are removed only after a confirmed successful
//! replay.

use std::future::Future;

use crate::error::AttendanceError;
use crate::storage::AttendanceStore;
use shared::types::AttendanceEvent;

/// Result of one drain pass
#[derive(Debug)]
pub enum DrainOutcome {
    /// Nothing queued
    Empty,
    /// The head entry was replayed and removed; remaining entries wait for
    /// the next trigger (one user-visible sync result per trigger)
    Replayed(AttendanceEvent),
    /// The whole queue was discarded: entries created under a lost session
    /// or against an unreachable backend cannot be trusted to replay
    Invalidated { dropped: u64 },
}

/// Persistent FIFO of pending attendance submissions
pub struct OfflineQueue {
    store: AttendanceStore,
}

impl OfflineQueue {
    pub fn new(store: AttendanceStore) -> Self {
        Self { store }
    }

    /// Append an event to the queue
    ///
    /// Never fails: a persistence failure here is logged and swallowed,
    /// since losing the user's action entirely is worse than silently
    /// degraded durability.
    pub fn enqueue(&self, event: AttendanceEvent) {
        match self.store.queue_push(&event) {
            Ok(seq) => {
                tracing::info!(
                    seq,
                    action = %event.action,
                    employee = %event.employee_id,
                    "Attendance event queued for offline replay"
                );
            }
            Err(e) => {
                tracing::error!("Failed to persist queued attendance event: {e}");
            }
        }
    }

    /// Replay the head of the queue through `submit`
    ///
    /// At most one entry is replayed per call. An `NotAuthenticated` or
    /// `NetworkUnavailable` failure discards the entire queue (clearing the
    /// cached session credential on the auth path); any other failure keeps
    /// the entry at the head and propagates.
    pub async fn drain<F, Fut>(&self, submit: F) -> Result<DrainOutcome, AttendanceError>
    where
        F: Fn(AttendanceEvent) -> Fut,
        Fut: Future<Output = Result<(), AttendanceError>>,
    {
        while let Some((seq, event)) = self.store.queue_front()? {
            match submit(event.clone()).await {
                Ok(()) => {
                    self.store.queue_remove(seq)?;
                    tracing::info!(seq, action = %event.action, "Queued event replayed");
                    return Ok(DrainOutcome::Replayed(event));
                }
                Err(AttendanceError::NotAuthenticated) => {
                    let dropped = self.invalidate()?;
                    // Queued events created under a now-invalid session
                    // cannot be safely re-attributed
                    self.store.session_token_clear()?;
                    tracing::warn!(dropped, "Session lost during replay, queue discarded");
                    return Ok(DrainOutcome::Invalidated { dropped });
                }
                Err(AttendanceError::NetworkUnavailable) => {
                    let dropped = self.invalidate()?;
                    tracing::warn!(dropped, "Backend unreachable during replay, queue discarded");
                    return Ok(DrainOutcome::Invalidated { dropped });
                }
                Err(e) => {
                    tracing::warn!(seq, "Replay failed, entry retained: {e}");
                    return Err(e);
                }
            }
        }

        Ok(DrainOutcome::Empty)
    }

    /// Number of pending entries
    pub fn len(&self) -> u64 {
        self.store.queue_len().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn invalidate(&self) -> Result<u64, AttendanceError> {
        Ok(self.store.queue_clear()?)
    }
}
