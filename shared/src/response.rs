//! Response types received from the HR backend

use serde::{Deserialize, Serialize};

use crate::types::{AttendanceAction, Timestamp};

/// Successful submission payload
///
/// `reference` identifies the created event server-side and is used to
/// fetch the server-assigned timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAttendanceResponse {
    pub reference: String,
}

/// One row of the today-status query (newest first, limit 2)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub action: AttendanceAction,
    pub created_at: Timestamp,
}

/// Body of an HTTP 417 validation rejection
///
/// The `message` text is pattern-matched client-side to classify the
/// rejection; see the error module for the matched substrings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub message: String,
}
