//! # fragwire-server
//!
//! Axum HTTP + `WebSocket` server that answers text commands with
//! server-rendered HTML fragments.
//!
//! - `GET /` serves the landing page that opens the socket
//! - `GET /echo` upgrades to a `WebSocket` and runs one session loop per client
//! - Each session keeps its own element counter; a recognized command renders
//!   its fragment with the counter, anything else is echoed back unchanged
//! - `GET /health` and `GET /metrics` for operators
//! - Graceful listener shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod commands;
pub mod config;
pub mod health;
pub mod landing;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use commands::{CommandAction, CommandTable, CommandTableBuilder};
pub use config::ServerConfig;
pub use landing::LandingPage;
pub use server::{AppState, FragwireServer};
