//! branch-gate server
//!
//! Serves permission resolution and admin record management over HTTP.

use branch_gate::{
    access_control::{BootstrapIdentity, PermissionResolver},
    auth::AdminGate,
    config::{LogFormat, load_config},
    server::{AppState, run_server},
    store::{MemoryStore, SharedStore},
};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// branch-gate - Role and branch permission server for the operations portal
#[derive(Parser, Debug)]
#[command(name = "branch-gate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "BRANCH_GATE_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides logging.level
    #[arg(long, env = "BRANCH_GATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// HTTP server host; overrides server.host
    #[arg(long, env = "BRANCH_GATE_HOST")]
    host: Option<String>,

    /// HTTP server port; overrides server.port
    #[arg(long, env = "BRANCH_GATE_PORT")]
    port: Option<u16>,
}

/// `--log-level` beats `RUST_LOG`, which beats `logging.level`
fn log_filter(cli_level: Option<&str>, config_level: &str) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level)),
    }
}

fn init_logging(filter: EnvFilter, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Configuration comes before logging so logging.format can apply
    let mut config = load_config(args.config.as_deref())?;

    init_logging(
        log_filter(args.log_level.as_deref(), &config.logging.level),
        config.logging.format,
    );

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting branch-gate"
    );

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let store: SharedStore = match &config.store.path {
        Some(path) => {
            let expanded = shellexpand::tilde(path);
            Arc::new(
                MemoryStore::open(expanded.into_owned())
                    .await
                    .inspect_err(|e| error!(error = %e, "Failed to open permission store"))?,
            )
        }
        None => {
            info!("No store.path configured, records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let bootstrap = BootstrapIdentity::from_config(config.access.bootstrap_email.as_deref());
    if bootstrap.email().is_none() {
        info!("No bootstrap identity configured");
    }
    let resolver = Arc::new(PermissionResolver::new(bootstrap));
    let gate = AdminGate::new(config.server.admin_password.clone());

    let state = AppState::new(store, resolver, gate);
    run_server(&config.server, state)
        .await
        .inspect_err(|e| error!(error = %e, "Server error"))?;

    Ok(())
}
