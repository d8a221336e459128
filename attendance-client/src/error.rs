//! Attendance error taxonomy
//!
//! Two families: retryable failures (routed to the offline queue, never
//! surfaced as errors) and terminal failures (surfaced to the user with
//! precomputed copy, never retried automatically).

use thiserror::Error;

use crate::location::LocationError;
use crate::storage::StorageError;
use shared::types::AttendanceAction;

/// Classified backend 417 validation rejection
///
/// All variants are terminal. `Other` carries the raw message when no
/// known pattern matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionKind {
    /// The action was already performed today
    AlreadyPerformed,
    /// Employee record missing or inactive server-side
    InvalidEmployee,
    /// No office location assigned, geofence cannot be evaluated server-side
    NoOfficeAssigned,
    /// Work-from-home submission without remote authorization
    RemoteNotAuthorized,
    /// The session lacks permission for attendance submission
    PermissionDenied,
    /// The server-side record was already finalized
    UpdateAfterSubmission,
    Other(String),
}

/// Classify a backend 417 message into a [`RejectionKind`]
///
/// The backend reports validation failures as free text, so this is the one
/// place that pattern-matches it. Each matched substring below is a contract
/// with the backend team: a wording change there breaks classification here
/// (the fallback is the generic `Other` copy, never a retry).
pub fn classify_backend_message(message: &str) -> RejectionKind {
    let lower = message.to_lowercase();

    // "already checked-in" / "already marked attendance" / "already performed"
    if lower.contains("already") {
        return RejectionKind::AlreadyPerformed;
    }
    // "invalid employee" / "employee ... not found"
    if lower.contains("invalid employee") || lower.contains("employee not found") {
        return RejectionKind::InvalidEmployee;
    }
    // "no office location assigned"
    if lower.contains("no office") || lower.contains("office location") {
        return RejectionKind::NoOfficeAssigned;
    }
    // "work from home is not authorized"
    if lower.contains("work from home") || lower.contains("wfh") {
        return RejectionKind::RemoteNotAuthorized;
    }
    // "not permitted" / "insufficient permission"
    if lower.contains("not permitted") || lower.contains("permission") {
        return RejectionKind::PermissionDenied;
    }
    // "cannot be updated after submission"
    if lower.contains("after submission") {
        return RejectionKind::UpdateAfterSubmission;
    }

    RejectionKind::Other(message.to_string())
}

/// Attendance client error type
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// No valid session; triggers the re-login flow
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Guard rail: today already has a check-in
    #[error("Already checked in today")]
    AlreadyCheckedIn,

    /// Guard rail: check-out without a prior check-in
    #[error("No check-in found for today")]
    NoCheckInFound,

    /// Advisory client-side geofence rejection
    #[error("Outside office geofence: {distance_meters:.0}m from office, allowed {radius_meters:.0}m")]
    OutsideGeofence {
        distance_meters: f64,
        radius_meters: f64,
    },

    /// Location acquisition failed
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Local fixed-window limit reached
    #[error("Too many submissions, try again shortly")]
    RateLimited,

    /// A submission is already in flight on this engine instance
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    /// Backend validation rejection (HTTP 417), classified from message text
    #[error("Backend rejected submission: {0:?}")]
    BackendRejected(RejectionKind),

    /// No network; retryable, routed to the offline queue
    #[error("Network unavailable")]
    NetworkUnavailable,

    /// Request timed out; retryable, routed to the offline queue
    #[error("Request timed out")]
    Timeout,

    /// Local persistence failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AttendanceError {
    /// Whether this failure should be queued for replay instead of surfaced
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AttendanceError::NetworkUnavailable | AttendanceError::Timeout
        )
    }

    /// Map a backend "already performed" check-in rejection onto the
    /// specific guard-rail error; check-out keeps the generic rejection
    /// since there is no distinct guard-rail state for it
    pub fn refine_for_action(self, action: AttendanceAction) -> Self {
        match (self, action) {
            (
                AttendanceError::BackendRejected(RejectionKind::AlreadyPerformed),
                AttendanceAction::CheckIn,
            ) => AttendanceError::AlreadyCheckedIn,
            (other, _) => other,
        }
    }

    /// User-facing toast copy: (title, explanation)
    pub fn user_message(&self) -> (String, String) {
        match self {
            AttendanceError::NotAuthenticated => (
                "Session expired".into(),
                "Please sign in again to record attendance.".into(),
            ),
            AttendanceError::AlreadyCheckedIn => (
                "Already checked in".into(),
                "You have already checked in today.".into(),
            ),
            AttendanceError::NoCheckInFound => (
                "No check-in found".into(),
                "Check in first before checking out.".into(),
            ),
            AttendanceError::OutsideGeofence {
                distance_meters,
                radius_meters,
            } => (
                "Outside office area".into(),
                format!(
                    "You are {distance_meters:.0}m from the office; attendance is allowed within {radius_meters:.0}m. Move closer or use work-from-home if authorized."
                ),
            ),
            AttendanceError::Location(LocationError::PermissionDenied) => (
                "Location permission needed".into(),
                "Allow location access in settings to record attendance.".into(),
            ),
            AttendanceError::Location(LocationError::ServicesDisabled) => (
                "Location services off".into(),
                "Turn on location services to record attendance.".into(),
            ),
            AttendanceError::Location(LocationError::Timeout) => (
                "Location timed out".into(),
                "Could not determine your position. Move outdoors and try again.".into(),
            ),
            AttendanceError::Location(LocationError::Unavailable(_)) => (
                "Location unavailable".into(),
                "Could not determine your position. Try again in a moment.".into(),
            ),
            AttendanceError::RateLimited => (
                "Too many attempts".into(),
                "Please wait a minute before trying again.".into(),
            ),
            AttendanceError::SubmissionInFlight => (
                "Submission in progress".into(),
                "Your previous attempt is still being processed.".into(),
            ),
            AttendanceError::BackendRejected(kind) => backend_rejection_message(kind),
            AttendanceError::NetworkUnavailable | AttendanceError::Timeout => (
                "No connection".into(),
                "Your attendance was saved and will sync automatically.".into(),
            ),
            AttendanceError::Storage(_) => (
                "Something went wrong".into(),
                "Could not save attendance data on this device.".into(),
            ),
        }
    }
}

fn backend_rejection_message(kind: &RejectionKind) -> (String, String) {
    match kind {
        RejectionKind::AlreadyPerformed => (
            "Already recorded".into(),
            "This attendance action was already recorded today.".into(),
        ),
        RejectionKind::InvalidEmployee => (
            "Employee not found".into(),
            "Your employee record could not be found. Contact HR.".into(),
        ),
        RejectionKind::NoOfficeAssigned => (
            "No office assigned".into(),
            "No office location is assigned to you. Contact HR.".into(),
        ),
        RejectionKind::RemoteNotAuthorized => (
            "Remote work not authorized".into(),
            "You are not authorized for work-from-home attendance.".into(),
        ),
        RejectionKind::PermissionDenied => (
            "Not permitted".into(),
            "Your account is not permitted to submit attendance.".into(),
        ),
        RejectionKind::UpdateAfterSubmission => (
            "Record finalized".into(),
            "Today's attendance record was already finalized.".into(),
        ),
        RejectionKind::Other(message) => ("Submission rejected".into(), message.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_patterns() {
        assert_eq!(
            classify_backend_message("Employee has already checked-in today"),
            RejectionKind::AlreadyPerformed
        );
        assert_eq!(
            classify_backend_message("Invalid Employee: EMP-0042"),
            RejectionKind::InvalidEmployee
        );
        assert_eq!(
            classify_backend_message("No office location assigned to employee"),
            RejectionKind::NoOfficeAssigned
        );
        assert_eq!(
            classify_backend_message("Work From Home is not authorized for this employee"),
            RejectionKind::RemoteNotAuthorized
        );
        assert_eq!(
            classify_backend_message("You are not permitted to perform this action"),
            RejectionKind::PermissionDenied
        );
        assert_eq!(
            classify_backend_message("Record cannot be changed after submission"),
            RejectionKind::UpdateAfterSubmission
        );
    }

    #[test]
    fn test_classify_unknown_falls_through() {
        let kind = classify_backend_message("Quota exceeded for shard 7");
        assert_eq!(
            kind,
            RejectionKind::Other("Quota exceeded for shard 7".to_string())
        );
    }

    #[test]
    fn test_retryable_split() {
        assert!(AttendanceError::NetworkUnavailable.is_retryable());
        assert!(AttendanceError::Timeout.is_retryable());
        assert!(!AttendanceError::NotAuthenticated.is_retryable());
        assert!(!AttendanceError::RateLimited.is_retryable());
        assert!(
            !AttendanceError::BackendRejected(RejectionKind::AlreadyPerformed).is_retryable()
        );
        assert!(!AttendanceError::Location(LocationError::Timeout).is_retryable());
    }

    #[test]
    fn test_refine_already_performed_by_action() {
        let e = AttendanceError::BackendRejected(RejectionKind::AlreadyPerformed);
        assert!(matches!(
            e.refine_for_action(AttendanceAction::CheckIn),
            AttendanceError::AlreadyCheckedIn
        ));

        let e = AttendanceError::BackendRejected(RejectionKind::AlreadyPerformed);
        assert!(matches!(
            e.refine_for_action(AttendanceAction::CheckOut),
            AttendanceError::BackendRejected(RejectionKind::AlreadyPerformed)
        ));

        // Non-matching errors pass through unchanged
        let e = AttendanceError::RateLimited;
        assert!(matches!(
            e.refine_for_action(AttendanceAction::CheckIn),
            AttendanceError::RateLimited
        ));
    }
}
