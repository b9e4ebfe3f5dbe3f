//! Server configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the fragwire server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"0.0.0.0"`).
    pub host: String,
    /// Port to bind (default `8080`, `0` auto-assigns).
    pub port: u16,
    /// Ceiling on one WebSocket message, in bytes (default 16 MiB).
    ///
    /// Messages below it are accepted whatever their content.
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            max_message_size: 16 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// `host:port` string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
