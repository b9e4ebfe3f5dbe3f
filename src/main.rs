//! # fragwire
//!
//! Server binary: loads settings, builds the command table and template
//! registries, then serves `/` and `/echo` until ctrl-c.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fragwire_server::shutdown::DEFAULT_DRAIN_TIMEOUT;
use fragwire_server::{CommandTable, FragwireServer, LandingPage, ServerConfig};
use fragwire_settings::{
    CommandSpec, DEFAULT_SETTINGS_FILE, FragwireSettings, LogFormat, LoggingSettings,
    load_settings_from_path,
};
use fragwire_templates::TemplateRegistry;
use tracing_subscriber::EnvFilter;

/// Fragwire server.
#[derive(Parser, Debug)]
#[command(name = "fragwire", about = "Server-rendered HTML fragments over WebSocket")]
struct Cli {
    /// Settings file (JSON). Missing file means defaults.
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Fragment template file (overrides settings).
    #[arg(long)]
    fragments: Option<String>,

    /// Landing page template file (overrides settings).
    #[arg(long)]
    page: Option<String>,
}

impl Cli {
    /// Apply CLI flags on top of file and env settings.
    fn apply(&self, settings: &mut FragwireSettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(ref fragments) = self.fragments {
            settings.templates.fragments.clone_from(fragments);
        }
        if let Some(ref page) = self.page {
            settings.templates.page.clone_from(page);
        }
    }
}

fn command_table(settings: &FragwireSettings) -> CommandTable {
    settings
        .commands
        .iter()
        .fold(CommandTable::builder(), |builder, (command, spec)| match spec {
            CommandSpec::Template(name) => builder.template(command.as_str(), name.as_str()),
            CommandSpec::Literal(markup) => builder.literal(command.as_str(), markup.as_str()),
        })
        .build()
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings_from_path(&cli.settings)
        .with_context(|| format!("Failed to load settings: {}", cli.settings.display()))?;
    cli.apply(&mut settings);

    init_tracing(&settings.logging);

    let metrics = fragwire_server::metrics::install_recorder()
        .context("Failed to install metrics recorder")?;

    let commands = command_table(&settings);
    tracing::info!(commands = ?commands.commands(), "command table ready");

    let fragments = Arc::new(TemplateRegistry::from_file(&settings.templates.fragments));
    let landing = LandingPage::new(
        Arc::new(TemplateRegistry::from_file(&settings.templates.page)),
        settings.templates.page_block.clone(),
    );

    let config = ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
        max_message_size: settings.server.max_message_size,
    };

    let server = FragwireServer::new(config, commands, fragments, landing, metrics);
    let (addr, handle) = server
        .listen()
        .await
        .context("Failed to bind server")?;

    tracing::info!("fragwire listening on http://{addr} (socket at ws://{addr}/echo)");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    if !server.shutdown().drain(handle, DEFAULT_DRAIN_TIMEOUT).await {
        tracing::warn!("server did not stop within the drain timeout");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
