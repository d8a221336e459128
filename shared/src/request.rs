//! Request types sent to the HR backend

use serde::{Deserialize, Serialize};

use crate::types::{AttendanceEvent, WorkType};

/// Body of the attendance submission POST
///
/// `work_type` is omitted entirely for office submissions; the backend
/// treats an absent field as "Office".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAttendanceRequest {
    pub employee: String,
    /// "Check-In" or "Check-Out"
    pub action: crate::types::AttendanceAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_type: Option<WorkType>,
}

impl From<&AttendanceEvent> for SubmitAttendanceRequest {
    fn from(event: &AttendanceEvent) -> Self {
        Self {
            employee: event.employee_id.clone(),
            action: event.action,
            latitude: event.coordinates.map(|c| c.latitude),
            longitude: event.coordinates.map(|c| c.longitude),
            work_type: match event.work_type {
                WorkType::Office => None,
                WorkType::WorkFromHome => Some(WorkType::WorkFromHome),
            },
        }
    }
}
