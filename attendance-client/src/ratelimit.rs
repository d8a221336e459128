//! Submission rate limiter
//!
//! Fixed-window counter persisted across process restarts. Intentionally
//! not a sliding window: the purpose is retry-storm prevention, not
//! fairness, and the fixed window keeps the persisted state to a single
//! small record.

use crate::storage::{AttendanceStore, RateWindow, StorageResult};

/// Default window length: one minute
pub const DEFAULT_WINDOW_MS: i64 = 60_000;
/// Default submissions allowed per window
pub const DEFAULT_LIMIT: u32 = 10;

/// Bounds outbound attendance submissions per device per time window
pub struct SubmissionRateLimiter {
    store: AttendanceStore,
    window_ms: i64,
    limit: u32,
}

impl SubmissionRateLimiter {
    pub fn new(store: AttendanceStore, window_ms: i64, limit: u32) -> Self {
        Self {
            store,
            window_ms,
            limit,
        }
    }

    /// Try to admit one submission now
    pub fn try_acquire(&self) -> StorageResult<bool> {
        self.try_acquire_at(shared::util::now_millis())
    }

    /// Try to admit one submission at the given instant
    ///
    /// Window expired: reset to `{count: 1, window_start_at: now}` and admit.
    /// At the limit: deny without mutating state. Otherwise increment and
    /// admit.
    pub fn try_acquire_at(&self, now_ms: i64) -> StorageResult<bool> {
        let window = self.store.rate_window_get()?;

        let admitted = match window {
            Some(w) if now_ms - w.window_start_at <= self.window_ms => {
                if w.count >= self.limit {
                    tracing::warn!(
                        count = w.count,
                        limit = self.limit,
                        "Submission rate limit reached"
                    );
                    return Ok(false);
                }
                self.store.rate_window_set(&RateWindow {
                    count: w.count + 1,
                    window_start_at: w.window_start_at,
                })?;
                true
            }
            _ => {
                self.store.rate_window_set(&RateWindow {
                    count: 1,
                    window_start_at: now_ms,
                })?;
                true
            }
        };

        Ok(admitted)
    }
}
