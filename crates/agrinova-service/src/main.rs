//! # agrinova-service
//!
//! AgriNova ML service binary: loads settings, brings up the embedding
//! backend, indexes the advisory corpus, resolves the language capabilities
//! and starts the HTTP server.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use agrinova_core::init_subscriber;
use agrinova_server::{AgriServer, ServerConfig, ServiceContext};
use agrinova_settings::{AgriSettings, load_settings, load_settings_from_path};
use anyhow::{Context, Result};
use clap::Parser;

/// AgriNova ML service.
#[derive(Parser, Debug)]
#[command(name = "agrinova", about = "AgriNova retrieval, embedding and language service")]
struct Cli {
    /// Settings file (defaults to `~/.agrinova/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Advisory corpus JSON file (overrides settings).
    #[arg(long)]
    corpus: Option<String>,

    /// Log filter directive, e.g. `debug` or `agrinova_retrieval=trace`.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn load_settings(&self) -> Result<AgriSettings> {
        let mut settings = match &self.settings {
            Some(path) => load_settings_from_path(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => load_settings().context("Failed to load settings")?,
        };
        self.apply_overrides(&mut settings);
        Ok(settings)
    }

    fn apply_overrides(&self, settings: &mut AgriSettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(ref corpus) = self.corpus {
            settings.corpus.path.clone_from(corpus);
        }
        if let Some(ref level) = self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}

/// Build the service context and wrap it in a server, without binding.
async fn build_server(settings: &AgriSettings) -> Result<AgriServer> {
    let context = ServiceContext::initialize(settings)
        .await
        .context("Failed to initialize service")?;
    Ok(AgriServer::new(
        ServerConfig::from_settings(&settings.server),
        Arc::new(context),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let settings = args.load_settings()?;

    init_subscriber(&settings.logging.level, settings.logging.format);
    tracing::info!(
        corpus = %settings.corpus.path,
        backend = ?settings.embedding.backend,
        "starting agrinova"
    );

    let mut server = build_server(&settings).await?;
    match agrinova_server::metrics::install_recorder() {
        Ok(handle) => server = server.with_metrics(handle),
        Err(e) => tracing::warn!(error = %e, "metrics recorder unavailable"),
    }

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("AgriNova listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.shutdown().graceful_shutdown(vec![handle], None).await;
    tracing::info!("Shutdown complete");
    Ok(())
}
