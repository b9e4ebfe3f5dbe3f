//! `FragwireServer` — Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use fragwire_templates::TemplateRegistry;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::commands::CommandTable;
use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::landing::LandingPage;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::dispatch::Dispatcher;
use crate::websocket::session::{ClientId, run_ws_session};

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Command table and fragment renderer shared by every session.
    pub dispatcher: Arc<Dispatcher>,
    /// Fragment templates, for health reporting.
    pub fragments: Arc<TemplateRegistry>,
    /// Page served at `/`.
    pub landing: LandingPage,
    /// Prometheus handle for `/metrics`.
    pub metrics: PrometheusHandle,
    /// Max WebSocket message size in bytes.
    pub max_message_size: usize,
    /// When the server started.
    pub start_time: Instant,
}

/// The fragwire server.
pub struct FragwireServer {
    config: ServerConfig,
    state: AppState,
    shutdown: Arc<ShutdownCoordinator>,
}

impl FragwireServer {
    /// Create a new server. Templates are not read until first use.
    pub fn new(
        config: ServerConfig,
        commands: CommandTable,
        fragments: Arc<TemplateRegistry>,
        landing: LandingPage,
        metrics: PrometheusHandle,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(commands), fragments.clone()));
        let state = AppState {
            dispatcher,
            fragments,
            landing,
            metrics,
            max_message_size: config.max_message_size,
            start_time: Instant::now(),
        };
        Self {
            config,
            state,
            shutdown: Arc::new(ShutdownCoordinator::new()),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(landing_handler))
            .route("/echo", get(ws_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the listener and serve in a background task until shutdown.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
            {
                warn!(error = %e, "server error");
            }
        });

        info!(%addr, commands = self.state.dispatcher.commands().len(), "fragwire listening");
        Ok((addr, handle))
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the command dispatcher.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.state.dispatcher
    }
}

/// GET /
async fn landing_handler(State(state): State<AppState>) -> Response {
    match state.landing.render() {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            warn!(error = %e, "landing page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "page unavailable").into_response()
        }
    }
}

/// GET /echo — upgrade to a WebSocket and run the session loop.
async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!(error = %rejection, "websocket upgrade rejected");
            return rejection.into_response();
        }
    };
    let client_id = ClientId::new();
    ws.max_message_size(state.max_message_size)
        .on_failed_upgrade(|e| warn!(error = %e, "websocket upgrade failed"))
        .on_upgrade(move |socket| run_ws_session(socket, client_id, state.dispatcher))
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time, state.fragments.status()))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.render()
}
