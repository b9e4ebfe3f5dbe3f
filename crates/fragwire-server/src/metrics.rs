//! Prometheus metrics recorder and metric names.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Call once at startup, before any metric is recorded.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// WebSocket sessions opened (counter).
pub const WS_SESSIONS_TOTAL: &str = "ws_sessions_total";
/// Open WebSocket sessions (gauge).
pub const WS_SESSIONS_ACTIVE: &str = "ws_sessions_active";
/// Inbound WebSocket messages, control frames included (counter).
pub const WS_MESSAGES_TOTAL: &str = "ws_messages_total";
/// Session lifetime (histogram).
pub const WS_SESSION_DURATION_SECONDS: &str = "ws_session_duration_seconds";
/// Fragments rendered (counter).
pub const FRAGMENTS_RENDERED_TOTAL: &str = "fragments_rendered_total";
/// Renders that failed and fell back to echo (counter).
pub const FRAGMENT_RENDER_FAILURES_TOTAL: &str = "fragment_render_failures_total";
/// Replies that echoed the inbound payload (counter).
pub const MESSAGES_ECHOED_TOTAL: &str = "messages_echoed_total";
