//! Tumor diagnosis web front end.
//!
//! Usage:
//!   diagnosis-web
//!   diagnosis-web --port 8080 --model model/breast_cancer_model.json --scaler model/scaler.json
//!   PORT=8080 DIAGNOSIS_DEBUG=1 diagnosis-web
//!   FLASK_DEBUG=1 diagnosis-web

mod app;
mod page;
mod theme;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use diagnosis_core::service::{DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use diagnosis_core::{ArtifactPaths, DiagnosisService};

use app::{router, AppState};

#[derive(Parser)]
#[command(name = "diagnosis-web")]
#[command(about = "Web form for tumor diagnosis with a pre-fitted classifier")]
struct Cli {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "5000", env = "PORT")]
    port: u16,

    /// Path to the classifier artifact
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH, env = "DIAGNOSIS_MODEL_PATH")]
    model: PathBuf,

    /// Path to the scaler artifact
    #[arg(short, long, default_value = DEFAULT_SCALER_PATH, env = "DIAGNOSIS_SCALER_PATH")]
    scaler: PathBuf,

    /// Verbose logging (RUST_LOG still takes precedence)
    #[arg(long, env = "DIAGNOSIS_DEBUG", value_parser = BoolishValueParser::new())]
    debug: bool,
}

/// `FLASK_DEBUG=1` is honored as an alias when the flag itself is off.
fn debug_enabled(flag: bool, flask_debug: Option<&str>) -> bool {
    flag || flask_debug.map(str::trim) == Some("1")
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},tower_http={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let debug = debug_enabled(cli.debug, std::env::var("FLASK_DEBUG").ok().as_deref());
    init_tracing(debug);

    let paths = ArtifactPaths {
        model_path: cli.model,
        scaler_path: cli.scaler,
    };
    let service = DiagnosisService::from_paths(&paths)?;
    info!(model_loaded = service.is_loaded(), "diagnosis service ready");

    let app = router(AppState { service });

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("Cannot bind {}:{}", cli.host, cli.port))?;
    let debug_on = debug;
    info!(addr = %listener.local_addr()?, debug = debug_on, "diagnosis-web listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("diagnosis-web stopped");
    Ok(())
}
