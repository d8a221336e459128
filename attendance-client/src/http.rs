//! HTTP client for the HR backend
//!
//! The backend reports validation failures as HTTP 417 with a free-text
//! message; classification of that text lives in the error module, keeping
//! the fragile wording coupling in one place.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{AttendanceError, RejectionKind, classify_backend_message};
use crate::storage::AttendanceStore;
use shared::request::SubmitAttendanceRequest;
use shared::response::{AttendanceRecord, BackendErrorBody, SubmitAttendanceResponse};
use shared::types::OfficeGeofence;

/// Backend seam used by the engine, status cache, and queue replay
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// POST one attendance event
    async fn submit(
        &self,
        request: &SubmitAttendanceRequest,
    ) -> Result<SubmitAttendanceResponse, AttendanceError>;

    /// Today's approved records for the employee, newest first, limit 2
    async fn today_records(&self, employee: &str)
    -> Result<Vec<AttendanceRecord>, AttendanceError>;

    /// The employee's assigned office geofence
    async fn office_geofence(&self, employee: &str) -> Result<OfficeGeofence, AttendanceError>;
}

/// reqwest-backed [`BackendApi`] implementation
pub struct HttpBackend {
    client: Client,
    base_url: String,
    store: AttendanceStore,
}

impl HttpBackend {
    /// Build from configuration; the session credential is read from the
    /// store per request (consumed, not owned, by this subsystem)
    pub fn new(config: &ClientConfig, store: AttendanceStore) -> Result<Self, AttendanceError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .map_err(map_transport_error)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    fn bearer(&self) -> Result<String, AttendanceError> {
        let token = self
            .store
            .session_token_get()?
            .ok_or(AttendanceError::NotAuthenticated)?;
        Ok(format!("Bearer {token}"))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AttendanceError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.bearer()?)
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AttendanceError> {
        let status = response.status();

        if !status.is_success() {
            return Err(Self::map_failure(status, response).await);
        }

        response.json().await.map_err(map_transport_error)
    }

    async fn map_failure(status: StatusCode, response: reqwest::Response) -> AttendanceError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AttendanceError::NotAuthenticated,
            StatusCode::EXPECTATION_FAILED => {
                // 417 is the backend's validation-rejection channel
                let body: BackendErrorBody = response.json().await.unwrap_or(BackendErrorBody {
                    message: String::new(),
                });
                AttendanceError::BackendRejected(classify_backend_message(&body.message))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                AttendanceError::BackendRejected(classify_backend_message(&text))
            }
        }
    }
}

/// Map reqwest failures onto the error taxonomy
///
/// Transport failures are retryable; a malformed success body is not,
/// since it cannot improve on retry.
fn map_transport_error(e: reqwest::Error) -> AttendanceError {
    if e.is_timeout() {
        AttendanceError::Timeout
    } else if e.is_decode() || e.is_builder() {
        AttendanceError::BackendRejected(RejectionKind::Other(e.to_string()))
    } else {
        AttendanceError::NetworkUnavailable
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn submit(
        &self,
        request: &SubmitAttendanceRequest,
    ) -> Result<SubmitAttendanceResponse, AttendanceError> {
        let url = format!("{}/api/attendance/submit", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.bearer()?)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::handle_response(response).await
    }

    async fn today_records(
        &self,
        employee: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        self.get(
            "/api/attendance/today",
            &[
                ("employee", employee.to_string()),
                ("since", shared::util::start_of_today_millis().to_string()),
                ("limit", "2".to_string()),
            ],
        )
        .await
    }

    async fn office_geofence(&self, employee: &str) -> Result<OfficeGeofence, AttendanceError> {
        self.get(
            "/api/attendance/office-location",
            &[("employee", employee.to_string())],
        )
        .await
    }
}
