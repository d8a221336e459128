//! Attendance Client - offline-resilient geofenced check-in/check-out
//!
//! The core of the workforce mobile client: validates attendance
//! transitions against today's server state, pre-checks the office
//! geofence from the device position, rate-limits outbound submissions,
//! and buffers failed submissions in a durable queue replayed when
//! connectivity returns.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod geofence;
pub mod http;
pub mod location;
pub mod monitor;
pub mod queue;
pub mod ratelimit;
pub mod status;
pub mod storage;

pub use config::ClientConfig;
pub use engine::{AttendanceSyncEngine, Outcome};
pub use error::{AttendanceError, RejectionKind};
pub use events::EngineEvent;
pub use http::{BackendApi, HttpBackend};
pub use location::{LocationError, LocationFix, LocationProvider, PositionSource};
pub use monitor::ConnectivityMonitor;
pub use queue::{DrainOutcome, OfflineQueue};
pub use ratelimit::SubmissionRateLimiter;
pub use status::AttendanceStatusCache;
pub use storage::{AttendanceStore, StorageError};

// Re-export shared types for convenience
pub use shared::types::{
    AttendanceAction, AttendanceDayStatus, AttendanceEvent, Coordinates, OfficeGeofence, WorkType,
};
