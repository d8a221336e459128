//! Engine event stream
//!
//! Advisory notifications emitted while a submission is in flight, consumed
//! by the UI layer to render progress and outcome toasts. Delivery is
//! best-effort: a full or unsubscribed channel drops events silently.

use shared::types::{AttendanceAction, AttendanceEvent};

/// Progress and outcome notifications for one submission attempt
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Fetching today's status before applying guard rails
    Validating { action: AttendanceAction },
    /// Acquiring device position ("fetching location…")
    LocatingDevice { high_accuracy: bool },
    /// Evaluating the office geofence
    GeofenceCheck,
    /// Submission is on the wire
    Submitting { action: AttendanceAction },
    /// Backend accepted the submission
    Succeeded { action: AttendanceAction },
    /// Saved offline, will sync when connectivity returns
    Queued { action: AttendanceAction },
    /// Terminal failure; `title`/`detail` are user-facing copy
    Failed { title: String, detail: String },
    /// A previously queued event was replayed successfully
    Replayed { event: AttendanceEvent },
    /// The offline queue was discarded (session loss or unreachable backend)
    QueueInvalidated { dropped: u64 },
}
