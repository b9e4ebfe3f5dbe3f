//! Graceful shutdown via `CancellationToken`.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default time to wait for the listener to drain.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Signals the listener to stop accepting and waits for it to finish.
///
/// Upgraded WebSocket sessions are not tracked; they end when their peers
/// disconnect or the process exits.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a new coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Initiate shutdown.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether shutdown has been initiated.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel, then wait up to `timeout` for `server` to return.
    ///
    /// Returns `false` if the wait timed out and the task was aborted.
    pub async fn drain(&self, server: JoinHandle<()>, timeout: Duration) -> bool {
        self.shutdown();
        info!(timeout_secs = timeout.as_secs(), "waiting for listener to stop");
        let abort = server.abort_handle();
        if tokio::time::timeout(timeout, server).await.is_ok() {
            true
        } else {
            warn!("listener did not stop after {timeout:?}, aborting");
            abort.abort();
            false
        }
    }
}
