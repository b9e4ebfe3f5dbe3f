//! `/health` endpoint.

use std::time::Instant;

use fragwire_templates::RegistryStatus;
use serde::Serialize;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Load state of the fragment templates.
    pub template_registry: RegistryStatus,
}

/// Build a health response.
pub fn health_check(start_time: Instant, template_registry: RegistryStatus) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        template_registry,
    }
}
