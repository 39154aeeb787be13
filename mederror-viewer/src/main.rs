//! mederror-viewer - local review UI for medical-text error annotations
//!
//! Serves an embedded page on localhost. Files picked in the browser are
//! uploaded as text; the session lives in memory for the life of the process.

use anyhow::{Context, Result};
use clap::Parser;
use mederror_common::config::{default_config_path, ConfigOverrides, ViewerConfig};
use mederror_common::Session;
use mederror_viewer::api::buildinfo::BuildInfo;
use mederror_viewer::{build_router, AppState};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for mederror-viewer
#[derive(Parser, Debug)]
#[command(name = "mederror-viewer")]
#[command(about = "Browse, re-categorize and export error annotations")]
#[command(version)]
struct Args {
    /// Address to bind [default: 127.0.0.1]
    #[arg(long, env = "MEDERROR_HOST")]
    host: Option<String>,

    /// Port to listen on [default: 5790]
    #[arg(short, long, env = "MEDERROR_PORT")]
    port: Option<u16>,

    /// Log level when RUST_LOG is unset [default: info]
    #[arg(long, env = "MEDERROR_LOG")]
    log_level: Option<String>,

    /// Config file [default: <config dir>/mederror/config.toml]
    #[arg(short, long, env = "MEDERROR_CONFIG")]
    config: Option<PathBuf>,

    /// Taxonomy YAML to load at startup
    #[arg(long)]
    taxonomy: Option<PathBuf>,

    /// Annotation JSON to load at startup
    #[arg(long)]
    annotations: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let config = ViewerConfig::resolve(
        ConfigOverrides {
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            taxonomy: args.taxonomy,
            annotations: args.annotations,
        },
        config_path.as_deref(),
    )
    .context("Invalid configuration")?;

    let default_filter = format!(
        "mederror_common={0},mederror_viewer={0},tower_http=warn",
        config.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    // Build identification first, before any file is touched
    info!("Starting mederror-viewer {}", BuildInfo::CURRENT);
    if let Some(path) = &config_path {
        info!("Config file: {}", path.display());
    }

    let mut session = Session::new();
    if let Some(path) = &config.taxonomy {
        session
            .load_taxonomy_file(path)
            .with_context(|| format!("Failed to load taxonomy {}", path.display()))?;
    }
    if let Some(path) = &config.annotations {
        session
            .load_annotations_file(path)
            .with_context(|| format!("Failed to load annotations {}", path.display()))?;
    }

    let app = build_router(AppState::new(session));

    let addr = config.bind_address()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("mederror-viewer listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
