//! Today's attendance status
//!
//! Fetches the server's view of today's check-in/check-out timestamps.
//! Deliberately uncached: every transition decision re-fetches, because
//! acting on stale status causes duplicate submissions or wrongly blocked
//! ones, which costs more than the extra round trip.

use std::sync::Arc;

use crate::error::AttendanceError;
use crate::http::BackendApi;
use shared::types::{AttendanceAction, AttendanceDayStatus};

/// Derives [`AttendanceDayStatus`] from the backend's today query
pub struct AttendanceStatusCache {
    backend: Arc<dyn BackendApi>,
}

impl AttendanceStatusCache {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self { backend }
    }

    /// Fetch today's status for the employee
    ///
    /// The backend returns today's approved records newest first (limit 2);
    /// the most recent record per action wins.
    pub async fn fetch_today(
        &self,
        employee_id: &str,
    ) -> Result<AttendanceDayStatus, AttendanceError> {
        let records = self.backend.today_records(employee_id).await?;

        let mut status = AttendanceDayStatus::default();
        for record in records {
            match record.action {
                AttendanceAction::CheckIn if status.check_in.is_none() => {
                    status.check_in = Some(record.created_at);
                }
                AttendanceAction::CheckOut if status.check_out.is_none() => {
                    status.check_out = Some(record.created_at);
                }
                _ => {}
            }
        }

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared::request::SubmitAttendanceRequest;
    use shared::response::{AttendanceRecord, SubmitAttendanceResponse};
    use shared::types::OfficeGeofence;

    struct FixedRecords(Vec<AttendanceRecord>);

    #[async_trait]
    impl BackendApi for FixedRecords {
        async fn submit(
            &self,
            _request: &SubmitAttendanceRequest,
        ) -> Result<SubmitAttendanceResponse, AttendanceError> {
            unreachable!("status tests never submit")
        }

        async fn today_records(
            &self,
            _employee: &str,
        ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
            Ok(self.0.clone())
        }

        async fn office_geofence(
            &self,
            _employee: &str,
        ) -> Result<OfficeGeofence, AttendanceError> {
            unreachable!("status tests never fetch the geofence")
        }
    }

    fn record(action: AttendanceAction, created_at: i64) -> AttendanceRecord {
        AttendanceRecord { action, created_at }
    }

    #[tokio::test]
    async fn test_no_records_means_blank_day() {
        let cache = AttendanceStatusCache::new(Arc::new(FixedRecords(vec![])));
        let status = cache.fetch_today("EMP-1").await.unwrap();
        assert_eq!(status, AttendanceDayStatus::default());
    }

    #[tokio::test]
    async fn test_both_actions_present() {
        let cache = AttendanceStatusCache::new(Arc::new(FixedRecords(vec![
            record(AttendanceAction::CheckOut, 1_700_000_600_000),
            record(AttendanceAction::CheckIn, 1_700_000_000_000),
        ])));
        let status = cache.fetch_today("EMP-1").await.unwrap();
        assert_eq!(status.check_in, Some(1_700_000_000_000));
        assert_eq!(status.check_out, Some(1_700_000_600_000));
    }

    #[tokio::test]
    async fn test_newest_record_per_action_wins() {
        // Newest first: a duplicate older check-in must not overwrite
        let cache = AttendanceStatusCache::new(Arc::new(FixedRecords(vec![
            record(AttendanceAction::CheckIn, 1_700_000_500_000),
            record(AttendanceAction::CheckIn, 1_700_000_000_000),
        ])));
        let status = cache.fetch_today("EMP-1").await.unwrap();
        assert_eq!(status.check_in, Some(1_700_000_500_000));
        assert_eq!(status.check_out, None);
    }
}
