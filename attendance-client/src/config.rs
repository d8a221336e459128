//! Client configuration

use crate::ratelimit::{DEFAULT_LIMIT, DEFAULT_WINDOW_MS};

/// Configuration for the attendance client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// HR backend base URL (e.g., "https://hr.example.com")
    pub base_url: String,

    /// HTTP request timeout in seconds
    pub timeout: u64,

    /// Per-attempt location acquisition timeout
    pub location_timeout_ms: u64,

    /// Oldest acceptable cached location fix
    pub location_maximum_age_ms: u64,

    /// Rate limiter window length
    pub rate_window_ms: i64,

    /// Submissions admitted per window
    pub rate_limit: u32,

    /// Replay queued events without re-running guard-rail validation.
    ///
    /// Preserves the original behavior where a queued event is assumed
    /// still valid; flip to false to re-fetch today's status before
    /// each replay.
    pub bypass_validation_on_replay: bool,
}

impl ClientConfig {
    /// Create a new configuration with defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            location_timeout_ms: 30_000,
            location_maximum_age_ms: 60_000,
            rate_window_ms: DEFAULT_WINDOW_MS,
            rate_limit: DEFAULT_LIMIT,
            bypass_validation_on_replay: true,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the location acquisition bounds
    pub fn with_location_bounds(mut self, timeout_ms: u64, maximum_age_ms: u64) -> Self {
        self.location_timeout_ms = timeout_ms;
        self.location_maximum_age_ms = maximum_age_ms;
        self
    }

    /// Set the submission rate limit
    pub fn with_rate_limit(mut self, window_ms: i64, limit: u32) -> Self {
        self.rate_window_ms = window_ms;
        self.rate_limit = limit;
        self
    }

    /// Re-validate guard rails before replaying queued events
    pub fn with_replay_validation(mut self) -> Self {
        self.bypass_validation_on_replay = false;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
