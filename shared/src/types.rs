//! Attendance domain types
//!
//! Core types used by the sync engine, offline queue, and backend client.

use serde::{Deserialize, Serialize};

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// A geographic coordinate pair (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Sentinel used for remote-work submissions where location
    /// acquisition failed and geofence compliance is not required.
    pub const ZERO: Coordinates = Coordinates {
        latitude: 0.0,
        longitude: 0.0,
    };
}

/// Attendance action — one of the two daily punch directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceAction {
    #[serde(rename = "Check-In")]
    CheckIn,
    #[serde(rename = "Check-Out")]
    CheckOut,
}

impl std::fmt::Display for AttendanceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceAction::CheckIn => write!(f, "Check-In"),
            AttendanceAction::CheckOut => write!(f, "Check-Out"),
        }
    }
}

/// Where the employee is working from today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkType {
    #[default]
    Office,
    #[serde(rename = "WFH")]
    WorkFromHome,
}

/// One check-in or check-out attempt
///
/// Created synchronously when the user triggers an action. Either consumed
/// by a successful remote submission or persisted in the offline queue
/// until replayed. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    /// Client-assigned event id
    pub id: String,
    pub employee_id: String,
    pub action: AttendanceAction,
    /// Absent only for remote-work submissions that bypass geofencing
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub work_type: WorkType,
    /// Set at creation, never mutated
    pub created_at: Timestamp,
}

impl AttendanceEvent {
    pub fn new(
        employee_id: impl Into<String>,
        action: AttendanceAction,
        coordinates: Option<Coordinates>,
        work_type: WorkType,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            employee_id: employee_id.into(),
            action,
            coordinates,
            work_type,
            created_at: crate::util::now_millis(),
        }
    }
}

/// The server's view of today's punches for one employee
///
/// Derived, never stored — refreshed on demand and used within a single
/// fetch-use cycle, since staleness directly causes duplicate submissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceDayStatus {
    pub check_in: Option<Timestamp>,
    pub check_out: Option<Timestamp>,
}

/// Office geofence assigned to an employee
///
/// Fetched on demand, never persisted locally. The client-side containment
/// check is advisory only; the backend is the authority.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OfficeGeofence {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "radius")]
    pub radius_meters: f64,
}

impl OfficeGeofence {
    pub fn center(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}
