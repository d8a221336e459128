//! Shared types for the attendance client
//!
//! Domain model for attendance events, backend wire shapes, and
//! timestamp utilities. This crate performs no I/O.

pub mod request;
pub mod response;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use types::{
    AttendanceAction, AttendanceDayStatus, AttendanceEvent, Coordinates, OfficeGeofence,
    Timestamp, WorkType,
};
