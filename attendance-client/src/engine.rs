//! Attendance sync engine
//!
//! Orchestrates one submission attempt:
//! `Validating -> LocatingDevice -> GeofenceCheck -> RateLimitCheck ->
//! Submitting -> {Succeeded | Queued | Failed}`.
//!
//! Retryable failures (no network, timeout) are swallowed at this boundary
//! and become the `Queued` outcome, which the caller treats as a
//! success-adjacent result, not an error. Terminal failures propagate with
//! precomputed user-facing copy. Queue replay re-enters at the Submitting
//! stage with a previously validated event.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::config::ClientConfig;
use crate::error::AttendanceError;
use crate::events::EngineEvent;
use crate::geofence;
use crate::http::BackendApi;
use crate::location::{LocationProvider, PositionSource};
use crate::queue::{DrainOutcome, OfflineQueue};
use crate::ratelimit::SubmissionRateLimiter;
use crate::status::AttendanceStatusCache;
use crate::storage::AttendanceStore;
use shared::request::SubmitAttendanceRequest;
use shared::types::{AttendanceAction, AttendanceDayStatus, AttendanceEvent, Coordinates, WorkType};

/// Successful result of a submission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Backend accepted the event
    Succeeded,
    /// Saved offline; will sync when connectivity returns
    Queued,
}

/// The attendance check-in/check-out orchestrator
///
/// One instance per user session. The in-flight guard admits at most one
/// submission at a time on this instance; it is advisory (in-memory) and
/// the backend remains the authority against duplicates.
pub struct AttendanceSyncEngine {
    backend: Arc<dyn BackendApi>,
    status: AttendanceStatusCache,
    location: LocationProvider,
    limiter: SubmissionRateLimiter,
    queue: OfflineQueue,
    employee: Mutex<Option<String>>,
    in_flight: tokio::sync::Mutex<()>,
    bypass_validation_on_replay: bool,
    events: broadcast::Sender<EngineEvent>,
}

impl AttendanceSyncEngine {
    pub fn new(
        store: AttendanceStore,
        backend: Arc<dyn BackendApi>,
        position_source: Arc<dyn PositionSource>,
        config: &ClientConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(32);

        Self {
            status: AttendanceStatusCache::new(backend.clone()),
            location: LocationProvider::new(
                position_source,
                config.location_timeout_ms,
                config.location_maximum_age_ms,
                events.clone(),
            ),
            limiter: SubmissionRateLimiter::new(
                store.clone(),
                config.rate_window_ms,
                config.rate_limit,
            ),
            queue: OfflineQueue::new(store),
            backend,
            employee: Mutex::new(None),
            in_flight: tokio::sync::Mutex::new(()),
            bypass_validation_on_replay: config.bypass_validation_on_replay,
            events,
        }
    }

    /// Subscribe to progress and outcome notifications
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Set the authenticated employee identity
    pub fn set_employee(&self, employee_id: impl Into<String>) {
        *self.employee.lock().unwrap() = Some(employee_id.into());
    }

    /// Clear the employee identity (logout)
    pub fn clear_employee(&self) {
        *self.employee.lock().unwrap() = None;
    }

    /// Number of events waiting for replay
    pub fn pending_count(&self) -> u64 {
        self.queue.len()
    }

    /// Record a check-in
    pub async fn check_in(&self, work_type: WorkType) -> Result<Outcome, AttendanceError> {
        self.submit_action(AttendanceAction::CheckIn, work_type).await
    }

    /// Record a check-out
    pub async fn check_out(&self, work_type: WorkType) -> Result<Outcome, AttendanceError> {
        self.submit_action(AttendanceAction::CheckOut, work_type).await
    }

    async fn submit_action(
        &self,
        action: AttendanceAction,
        work_type: WorkType,
    ) -> Result<Outcome, AttendanceError> {
        // Single-flight guard: at most one in-flight submission per engine
        // instance, regardless of caller discipline
        let Ok(_guard) = self.in_flight.try_lock() else {
            return Err(self.fail(AttendanceError::SubmissionInFlight));
        };

        let employee = self
            .employee
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| self.fail(AttendanceError::NotAuthenticated))?;

        tracing::info!(%action, ?work_type, employee = %employee, "Attendance submission started");
        let _ = self.events.send(EngineEvent::Validating { action });

        // Guard rails against duplicate submission, from a fresh status
        // fetch. When the status query itself fails with a retryable error
        // the guards are skipped: the backend re-validates authoritatively,
        // and an offline device must still be able to capture the event.
        match self.status.fetch_today(&employee).await {
            Ok(day) => self.check_guard_rails(action, day).map_err(|e| self.fail(e))?,
            Err(e) if e.is_retryable() => {
                tracing::warn!("Status fetch failed ({e}), guard rails skipped");
            }
            Err(e) => return Err(self.fail(e)),
        }

        // Location is always attempted; remote-work submissions tolerate
        // failure and fall back to the zero sentinel since they bypass
        // geofencing
        let coordinates = match self.location.acquire().await {
            Ok(fix) => Some(Coordinates::new(fix.latitude, fix.longitude)),
            Err(e) if work_type == WorkType::WorkFromHome => {
                tracing::warn!("Location unavailable for WFH submission ({e}), using sentinel");
                Some(Coordinates::ZERO)
            }
            Err(e) => return Err(self.fail(e.into())),
        };

        if work_type != WorkType::WorkFromHome {
            self.check_geofence(&employee, coordinates)
                .await
                .map_err(|e| self.fail(e))?;
        }

        let admitted = self
            .limiter
            .try_acquire()
            .map_err(|e| self.fail(AttendanceError::Storage(e)))?;
        if !admitted {
            return Err(self.fail(AttendanceError::RateLimited));
        }

        let event = AttendanceEvent::new(employee.clone(), action, coordinates, work_type);
        let _ = self.events.send(EngineEvent::Submitting { action });

        match self.backend.submit(&SubmitAttendanceRequest::from(&event)).await {
            Ok(response) => {
                tracing::info!(%action, reference = %response.reference, "Attendance recorded");
                let _ = self.events.send(EngineEvent::Succeeded { action });
                self.refresh_status(&employee).await;
                Ok(Outcome::Succeeded)
            }
            Err(e) if e.is_retryable() => {
                tracing::warn!(%action, "Submission failed ({e}), saving offline");
                self.queue.enqueue(event);
                let _ = self.events.send(EngineEvent::Queued { action });
                Ok(Outcome::Queued)
            }
            Err(e) => Err(self.fail(e.refine_for_action(action))),
        }
    }

    /// Replay queued submissions; at most one replay succeeds per call
    ///
    /// Triggered by the connectivity monitor and by an explicit user "sync
    /// now". Skipped while a foreground submission is in flight.
    pub async fn sync_now(&self) -> Result<DrainOutcome, AttendanceError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("Submission in flight, skipping queue drain");
            return Ok(DrainOutcome::Empty);
        };

        let outcome = self.queue.drain(|event| self.replay_one(event)).await?;

        match &outcome {
            DrainOutcome::Replayed(event) => {
                let _ = self.events.send(EngineEvent::Replayed {
                    event: event.clone(),
                });
            }
            DrainOutcome::Invalidated { dropped } => {
                let _ = self.events.send(EngineEvent::QueueInvalidated { dropped: *dropped });
            }
            DrainOutcome::Empty => {}
        }

        Ok(outcome)
    }

    /// Submit one previously queued event, re-entering at the Submitting
    /// stage; guard-rail re-validation is controlled by
    /// `bypass_validation_on_replay`
    async fn replay_one(&self, event: AttendanceEvent) -> Result<(), AttendanceError> {
        if !self.bypass_validation_on_replay {
            let day = self.status.fetch_today(&event.employee_id).await?;
            self.check_guard_rails(event.action, day)?;
        }

        self.backend
            .submit(&SubmitAttendanceRequest::from(&event))
            .await
            .map(|_| ())
    }

    fn check_guard_rails(
        &self,
        action: AttendanceAction,
        day: AttendanceDayStatus,
    ) -> Result<(), AttendanceError> {
        match action {
            AttendanceAction::CheckIn if day.check_in.is_some() => {
                Err(AttendanceError::AlreadyCheckedIn)
            }
            AttendanceAction::CheckOut if day.check_in.is_none() => {
                Err(AttendanceError::NoCheckInFound)
            }
            _ => Ok(()),
        }
    }

    /// Advisory geofence gate; a lookup failure skips the check since the
    /// backend is the authority and rejects genuinely out-of-fence events
    async fn check_geofence(
        &self,
        employee: &str,
        coordinates: Option<Coordinates>,
    ) -> Result<(), AttendanceError> {
        let Some(point) = coordinates else {
            return Ok(());
        };

        let _ = self.events.send(EngineEvent::GeofenceCheck);

        match self.backend.office_geofence(employee).await {
            Ok(fence) => {
                let distance = geofence::distance_meters(point, fence.center());
                if distance > fence.radius_meters {
                    return Err(AttendanceError::OutsideGeofence {
                        distance_meters: distance,
                        radius_meters: fence.radius_meters,
                    });
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Geofence lookup failed ({e}), check skipped");
                Ok(())
            }
        }
    }

    async fn refresh_status(&self, employee: &str) {
        if let Err(e) = self.status.fetch_today(employee).await {
            tracing::debug!("Post-submission status refresh failed: {e}");
        }
    }

    /// Emit the terminal-failure notification and hand the error back
    fn fail(&self, err: AttendanceError) -> AttendanceError {
        let (title, detail) = err.user_message();
        tracing::info!(%title, "Attendance submission failed: {err}");
        let _ = self.events.send(EngineEvent::Failed { title, detail });
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RejectionKind;
    use crate::location::{LocationError, LocationFix, PositionRequest};
    use async_trait::async_trait;
    use shared::response::{AttendanceRecord, SubmitAttendanceResponse};
    use shared::types::OfficeGeofence;
    use shared::util::now_millis;

    const OFFICE_LAT: f64 = 23.8103;
    const OFFICE_LON: f64 = 90.4125;
    /// ~1.5km north of the office
    const FAR_LAT: f64 = 23.8240;

    /// How the fake backend answers submissions
    #[derive(Clone)]
    enum SubmitMode {
        Accept,
        Fail(fn() -> AttendanceError),
        /// Never resolves (simulates a hung request)
        Hang,
    }

    struct FakeBackendInner {
        records: Vec<AttendanceRecord>,
        submit_mode: SubmitMode,
        submits: Vec<SubmitAttendanceRequest>,
        geofence: Result<OfficeGeofence, fn() -> AttendanceError>,
        records_error: Option<fn() -> AttendanceError>,
    }

    struct FakeBackend(Mutex<FakeBackendInner>);

    impl FakeBackend {
        fn new() -> Self {
            Self(Mutex::new(FakeBackendInner {
                records: Vec::new(),
                submit_mode: SubmitMode::Accept,
                submits: Vec::new(),
                geofence: Ok(OfficeGeofence {
                    latitude: OFFICE_LAT,
                    longitude: OFFICE_LON,
                    radius_meters: 200.0,
                }),
                records_error: None,
            }))
        }

        fn set_submit_mode(&self, mode: SubmitMode) {
            self.0.lock().unwrap().submit_mode = mode;
        }

        fn set_records_error(&self, e: fn() -> AttendanceError) {
            self.0.lock().unwrap().records_error = Some(e);
        }

        fn submit_count(&self) -> usize {
            self.0.lock().unwrap().submits.len()
        }

        fn last_submit(&self) -> SubmitAttendanceRequest {
            self.0.lock().unwrap().submits.last().unwrap().clone()
        }
    }

    #[async_trait]
    impl BackendApi for FakeBackend {
        async fn submit(
            &self,
            request: &SubmitAttendanceRequest,
        ) -> Result<SubmitAttendanceResponse, AttendanceError> {
            let mode = {
                let mut inner = self.0.lock().unwrap();
                inner.submits.push(request.clone());
                inner.submit_mode.clone()
            };
            match mode {
                SubmitMode::Accept => {
                    let mut inner = self.0.lock().unwrap();
                    let action = inner.submits.last().unwrap().action;
                    // Accepted events show up in subsequent status queries,
                    // newest first
                    inner.records.insert(
                        0,
                        AttendanceRecord {
                            action,
                            created_at: now_millis(),
                        },
                    );
                    Ok(SubmitAttendanceResponse {
                        reference: format!("ATT-{}", inner.records.len()),
                    })
                }
                SubmitMode::Fail(make) => Err(make()),
                SubmitMode::Hang => std::future::pending().await,
            }
        }

        async fn today_records(
            &self,
            _employee: &str,
        ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
            let inner = self.0.lock().unwrap();
            if let Some(make) = inner.records_error {
                return Err(make());
            }
            Ok(inner.records.clone())
        }

        async fn office_geofence(
            &self,
            _employee: &str,
        ) -> Result<OfficeGeofence, AttendanceError> {
            match &self.0.lock().unwrap().geofence {
                Ok(fence) => Ok(*fence),
                Err(make) => Err(make()),
            }
        }
    }

    struct FakeSource(Result<LocationFix, LocationError>);

    #[async_trait]
    impl PositionSource for FakeSource {
        async fn check_permission(&self) -> Result<(), LocationError> {
            match &self.0 {
                Err(LocationError::PermissionDenied) => Err(LocationError::PermissionDenied),
                _ => Ok(()),
            }
        }

        async fn current_position(
            &self,
            _request: &PositionRequest,
        ) -> Result<LocationFix, LocationError> {
            self.0.clone()
        }
    }

    fn at_office() -> FakeSource {
        FakeSource(Ok(LocationFix {
            latitude: OFFICE_LAT,
            longitude: OFFICE_LON,
            accuracy: 10.0,
        }))
    }

    fn far_away() -> FakeSource {
        FakeSource(Ok(LocationFix {
            latitude: FAR_LAT,
            longitude: OFFICE_LON,
            accuracy: 10.0,
        }))
    }

    struct Harness {
        engine: Arc<AttendanceSyncEngine>,
        backend: Arc<FakeBackend>,
        store: AttendanceStore,
    }

    fn harness_with(source: FakeSource, config: ClientConfig) -> Harness {
        let store = AttendanceStore::open_in_memory().unwrap();
        store.session_token_set("tok").unwrap();
        let backend = Arc::new(FakeBackend::new());
        let engine = Arc::new(AttendanceSyncEngine::new(
            store.clone(),
            backend.clone(),
            Arc::new(source),
            &config,
        ));
        engine.set_employee("EMP-1");
        Harness {
            engine,
            backend,
            store,
        }
    }

    fn harness(source: FakeSource) -> Harness {
        harness_with(source, ClientConfig::new("http://backend"))
    }

    #[tokio::test]
    async fn test_check_in_inside_fence_succeeds() {
        let h = harness(at_office());
        let mut events = h.engine.subscribe();

        let outcome = h.engine.check_in(WorkType::Office).await.unwrap();
        assert_eq!(outcome, Outcome::Succeeded);
        assert_eq!(h.backend.submit_count(), 1);

        // Status now reports a non-null check-in
        let status = AttendanceStatusCache::new(h.backend.clone())
            .fetch_today("EMP-1")
            .await
            .unwrap();
        assert!(status.check_in.is_some());

        // Progress events arrived in state-machine order
        assert!(matches!(events.try_recv(), Ok(EngineEvent::Validating { .. })));
        assert!(matches!(events.try_recv(), Ok(EngineEvent::LocatingDevice { .. })));
        assert!(matches!(events.try_recv(), Ok(EngineEvent::GeofenceCheck)));
        assert!(matches!(events.try_recv(), Ok(EngineEvent::Submitting { .. })));
        assert!(matches!(events.try_recv(), Ok(EngineEvent::Succeeded { .. })));
    }

    #[tokio::test]
    async fn test_second_check_in_hits_guard_rail() {
        let h = harness(at_office());
        h.engine.check_in(WorkType::Office).await.unwrap();
        assert_eq!(h.backend.submit_count(), 1);

        let err = h.engine.check_in(WorkType::Office).await.unwrap_err();
        assert!(matches!(err, AttendanceError::AlreadyCheckedIn));
        // Guard rail fired before the submission endpoint was contacted
        assert_eq!(h.backend.submit_count(), 1);
    }

    #[tokio::test]
    async fn test_check_out_without_check_in_fails() {
        let h = harness(at_office());
        let err = h.engine.check_out(WorkType::Office).await.unwrap_err();
        assert!(matches!(err, AttendanceError::NoCheckInFound));
        assert_eq!(h.backend.submit_count(), 0);
    }

    #[tokio::test]
    async fn test_outside_fence_office_rejected_wfh_proceeds() {
        let h = harness(far_away());
        h.engine.check_in(WorkType::WorkFromHome).await.unwrap();

        // Office check-out from the same spot: advisory rejection
        let err = h.engine.check_out(WorkType::Office).await.unwrap_err();
        match err {
            AttendanceError::OutsideGeofence {
                distance_meters,
                radius_meters,
            } => {
                assert!(distance_meters > radius_meters);
            }
            other => panic!("expected OutsideGeofence, got {other}"),
        }

        // Same check-out as WFH bypasses the fence and submits
        let before = h.backend.submit_count();
        h.engine.check_out(WorkType::WorkFromHome).await.unwrap();
        assert_eq!(h.backend.submit_count(), before + 1);
    }

    #[tokio::test]
    async fn test_geofence_lookup_failure_skips_check() {
        let h = harness(far_away());
        h.backend.0.lock().unwrap().geofence = Err(|| AttendanceError::Timeout);

        // Outside the fence, but the fence could not be fetched: proceed,
        // the backend is the authority
        let outcome = h.engine.check_in(WorkType::Office).await.unwrap();
        assert_eq!(outcome, Outcome::Succeeded);
    }

    #[tokio::test]
    async fn test_network_failure_queues_event() {
        let h = harness(at_office());
        h.backend.set_submit_mode(SubmitMode::Fail(|| AttendanceError::Timeout));

        let mut events = h.engine.subscribe();
        let outcome = h.engine.check_in(WorkType::Office).await.unwrap();
        assert_eq!(outcome, Outcome::Queued);
        assert_eq!(h.engine.pending_count(), 1);

        let queued = h.store.queue_entries().unwrap();
        assert_eq!(queued[0].action, AttendanceAction::CheckIn);

        let saw_queued = std::iter::from_fn(|| events.try_recv().ok())
            .any(|e| matches!(e, EngineEvent::Queued { .. }));
        assert!(saw_queued);
    }

    #[tokio::test]
    async fn test_backend_417_is_terminal_and_not_queued() {
        let h = harness(at_office());
        h.backend.set_submit_mode(SubmitMode::Fail(|| {
            AttendanceError::BackendRejected(RejectionKind::AlreadyPerformed)
        }));

        let err = h.engine.check_in(WorkType::Office).await.unwrap_err();
        // "Already performed" on a check-in maps to the guard-rail kind
        assert!(matches!(err, AttendanceError::AlreadyCheckedIn));
        assert_eq!(h.engine.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_location_failure_terminal_for_office_tolerated_for_wfh() {
        let h = harness(FakeSource(Err(LocationError::ServicesDisabled)));

        let err = h.engine.check_in(WorkType::Office).await.unwrap_err();
        assert!(matches!(
            err,
            AttendanceError::Location(LocationError::ServicesDisabled)
        ));
        assert_eq!(h.backend.submit_count(), 0);

        // WFH tolerates the failure with the zero sentinel
        h.engine.check_in(WorkType::WorkFromHome).await.unwrap();
        let request = h.backend.last_submit();
        assert_eq!(request.latitude, Some(0.0));
        assert_eq!(request.longitude, Some(0.0));
    }

    #[tokio::test]
    async fn test_rate_limit_blocks_submission() {
        let config = ClientConfig::new("http://backend").with_rate_limit(60_000, 1);
        let h = harness_with(at_office(), config);

        h.engine.check_in(WorkType::Office).await.unwrap();
        let err = h.engine.check_out(WorkType::Office).await.unwrap_err();
        assert!(matches!(err, AttendanceError::RateLimited));
        assert_eq!(h.backend.submit_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_identity_fails_immediately() {
        let h = harness(at_office());
        h.engine.clear_employee();
        let err = h.engine.check_in(WorkType::Office).await.unwrap_err();
        assert!(matches!(err, AttendanceError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_offline_status_fetch_skips_guards_and_queues() {
        let h = harness(at_office());
        h.backend.set_records_error(|| AttendanceError::NetworkUnavailable);
        h.backend.0.lock().unwrap().geofence = Err(|| AttendanceError::NetworkUnavailable);
        h.backend.set_submit_mode(SubmitMode::Fail(|| AttendanceError::NetworkUnavailable));

        // Fully offline: status unknown, fence unknown, submit fails.
        // The event must still be captured
        let outcome = h.engine.check_in(WorkType::Office).await.unwrap();
        assert_eq!(outcome, Outcome::Queued);
        assert_eq!(h.engine.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_reentrancy_guard_rejects_concurrent_submission() {
        let h = harness(at_office());
        h.backend.set_submit_mode(SubmitMode::Hang);

        let engine = h.engine.clone();
        let first = tokio::spawn(async move { engine.check_in(WorkType::Office).await });
        // Let the first submission reach the hung request
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let err = h.engine.check_out(WorkType::Office).await.unwrap_err();
        assert!(matches!(err, AttendanceError::SubmissionInFlight));

        first.abort();
    }

    #[tokio::test]
    async fn test_sync_now_replays_head_and_keeps_rest() {
        let h = harness(at_office());
        h.backend.set_submit_mode(SubmitMode::Fail(|| AttendanceError::Timeout));
        h.engine.check_in(WorkType::Office).await.unwrap();
        h.engine.check_out(WorkType::Office).await.unwrap_err(); // guard rail: no check-in recorded

        // Queue a second event by hand to observe the one-per-drain policy
        h.store
            .queue_push(&AttendanceEvent::new(
                "EMP-1",
                AttendanceAction::CheckOut,
                Some(Coordinates::new(OFFICE_LAT, OFFICE_LON)),
                WorkType::Office,
            ))
            .unwrap();
        assert_eq!(h.engine.pending_count(), 2);

        h.backend.set_submit_mode(SubmitMode::Accept);
        let outcome = h.engine.sync_now().await.unwrap();
        assert!(matches!(outcome, DrainOutcome::Replayed(_)));
        // One success per drain trigger
        assert_eq!(h.engine.pending_count(), 1);

        let outcome = h.engine.sync_now().await.unwrap();
        assert!(matches!(outcome, DrainOutcome::Replayed(_)));
        assert_eq!(h.engine.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_sync_now_auth_failure_invalidates_queue() {
        let h = harness(at_office());
        h.backend.set_submit_mode(SubmitMode::Fail(|| AttendanceError::Timeout));
        h.engine.check_in(WorkType::Office).await.unwrap();
        assert_eq!(h.engine.pending_count(), 1);

        h.backend.set_submit_mode(SubmitMode::Fail(|| AttendanceError::NotAuthenticated));
        let outcome = h.engine.sync_now().await.unwrap();
        assert!(matches!(outcome, DrainOutcome::Invalidated { dropped: 1 }));
        assert_eq!(h.engine.pending_count(), 0);
        // Session credential cleared alongside the queue
        assert!(h.store.session_token_get().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replay_validation_when_bypass_disabled() {
        let config = ClientConfig::new("http://backend").with_replay_validation();
        let h = harness_with(at_office(), config);

        // Queue a check-in, then let one succeed through the normal path so
        // the guard rail would reject a replayed duplicate
        h.backend.set_submit_mode(SubmitMode::Fail(|| AttendanceError::Timeout));
        h.engine.check_in(WorkType::Office).await.unwrap();
        h.backend.set_submit_mode(SubmitMode::Accept);
        // Re-validation fetches fresh status: a check-in is now on record
        h.backend.0.lock().unwrap().records.insert(
            0,
            AttendanceRecord {
                action: AttendanceAction::CheckIn,
                created_at: now_millis(),
            },
        );

        let result = h.engine.sync_now().await;
        assert!(matches!(result, Err(AttendanceError::AlreadyCheckedIn)));
        // The entry stays queued; replay policy never silently drops events
        assert_eq!(h.engine.pending_count(), 1);
    }
}
