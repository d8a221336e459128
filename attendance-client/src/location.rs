//! Device location acquisition
//!
//! Two-tier accuracy strategy: high-accuracy (GPS) acquisition frequently
//! times out indoors, while network positioning is faster but coarser, so a
//! timeout on the first attempt triggers exactly one low-accuracy retry.
//! Any non-timeout failure surfaces immediately.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::events::EngineEvent;

/// Location acquisition failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location services are disabled")]
    ServicesDisabled,

    #[error("Location request timed out")]
    Timeout,

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// Parameters for one positioning attempt
#[derive(Debug, Clone, Copy)]
pub struct PositionRequest {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    /// Oldest acceptable cached fix
    pub maximum_age_ms: u64,
}

/// A resolved device position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Estimated accuracy radius in meters
    pub accuracy: f64,
}

/// Platform positioning seam
///
/// The production implementation lives behind the platform bridge
/// (permission prompt + positioning API); tests inject fakes.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Request the fine-location permission, failing fast if refused
    async fn check_permission(&self) -> Result<(), LocationError>;

    /// Resolve the current position within the request bounds
    async fn current_position(&self, request: &PositionRequest)
    -> Result<LocationFix, LocationError>;
}

/// Location provider with accuracy fallback
pub struct LocationProvider {
    source: Arc<dyn PositionSource>,
    timeout_ms: u64,
    maximum_age_ms: u64,
    events: broadcast::Sender<EngineEvent>,
}

impl LocationProvider {
    pub fn new(
        source: Arc<dyn PositionSource>,
        timeout_ms: u64,
        maximum_age_ms: u64,
        events: broadcast::Sender<EngineEvent>,
    ) -> Self {
        Self {
            source,
            timeout_ms,
            maximum_age_ms,
            events,
        }
    }

    /// Acquire the current device position
    ///
    /// Permission is checked first. A `Timeout` on the high-accuracy attempt
    /// triggers one low-accuracy retry with the same bounds; every other
    /// error is surfaced without retry.
    pub async fn acquire(&self) -> Result<LocationFix, LocationError> {
        self.source.check_permission().await?;

        match self.attempt(true).await {
            Ok(fix) => Ok(fix),
            Err(LocationError::Timeout) => {
                tracing::warn!("High-accuracy location timed out, retrying with low accuracy");
                self.attempt(false).await
            }
            Err(e) => Err(e),
        }
    }

    async fn attempt(&self, high_accuracy: bool) -> Result<LocationFix, LocationError> {
        // Advisory progress notification, not part of the return contract
        let _ = self.events.send(EngineEvent::LocatingDevice { high_accuracy });

        let request = PositionRequest {
            high_accuracy,
            timeout_ms: self.timeout_ms,
            maximum_age_ms: self.maximum_age_ms,
        };
        self.source.current_position(&request).await
    }
}
