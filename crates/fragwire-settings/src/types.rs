//! Settings types with compiled defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root settings object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragwireSettings {
    /// Listener settings.
    pub server: ServerSettings,
    /// Template file locations.
    pub templates: TemplateSettings,
    /// Log output.
    pub logging: LoggingSettings,
    /// Command table: inbound command token → action.
    pub commands: BTreeMap<String, CommandSpec>,
}

impl Default for FragwireSettings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            templates: TemplateSettings::default(),
            logging: LoggingSettings::default(),
            commands: default_commands(),
        }
    }
}

/// What a command does when received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandSpec {
    /// Render the named fragment with the session counter.
    Template(String),
    /// Reply with fixed markup; the counter is left alone.
    Literal(String),
}

fn default_commands() -> BTreeMap<String, CommandSpec> {
    BTreeMap::from([
        (
            "addButton".to_string(),
            CommandSpec::Template("buttonTemplate1".into()),
        ),
        (
            "addTemplate".to_string(),
            CommandSpec::Template("socketTemplate1".into()),
        ),
        (
            "addParagraph".to_string(),
            CommandSpec::Template("paragraphTemplate1".into()),
        ),
        (
            "addInput".to_string(),
            CommandSpec::Literal("<input placeholder='put something here'></input>".into()),
        ),
    ])
}

/// Listener settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Memory ceiling on one WebSocket message, in bytes (default 16 MiB).
    pub max_message_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            max_message_size: 16 * 1024 * 1024,
        }
    }
}

/// Template file locations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// File holding the fragment blocks.
    pub fragments: String,
    /// File holding the landing page.
    pub page: String,
    /// Block of `page` rendered at `/`.
    pub page_block: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            fragments: "templates/socketTemplates.html".into(),
            page: "templates/websockets1.html".into(),
            page_block: "websocket".into(),
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Log output settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive (`RUST_LOG` wins when set).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}
