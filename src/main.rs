//! Twinning coordinator daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────────┐
//!                 │                   TWINNING COORDINATOR                    │
//!                 │                                                           │
//!   HTTP caller   │  ┌─────────┐   ┌──────────────┐   ┌─────────────┐         │
//!   ──────────────┼─▶│   api   │──▶│ orchestrator │──▶│ dispatcher  │─────────┼──▶ Backend
//!                 │  │ routes  │   │  evaluate →  │   │ reachability│         │    service
//!                 │  └─────────┘   │  dispatch    │   │  + timeout  │         │
//!                 │                └──────┬───────┘   └──────┬──────┘         │
//!                 │                       │                  │ snapshot read  │
//!                 │                       ▼                  ▼                │
//!                 │                ┌──────────────┐   ┌─────────────┐  probes │
//!                 │                │ policy gate  │   │  registry   │─────────┼──▶ /health
//!                 │                │ trust, bias, │   │ worker task │         │
//!                 │                │ safeguards   │   │ + snapshots │         │
//!                 │                └──────────────┘   └─────────────┘         │
//!                 │                                                           │
//!                 │   config · observability (tracing, metrics) · lifecycle   │
//!                 └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use twinning_core::api::{self, AppState};
use twinning_core::config::{load_config, load_defaults};
use twinning_core::lifecycle::{signals, Services, Shutdown};
use twinning_core::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "twinning-core")]
#[command(about = "Service registry and policy-gated dispatcher", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_defaults()?,
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "twinning-core starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        probe_interval_ms = config.health_check.interval_ms,
        policy_enabled = config.policy.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let services = Services::start(&config, &shutdown)?;

    let state = AppState {
        registry: services.registry.clone(),
        orchestrator: services.orchestrator.clone(),
    };
    let app = api::router(
        state,
        Duration::from_secs(config.listener.request_timeout_secs),
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server_shutdown = shutdown.clone();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        signal_shutdown.trigger();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_shutdown.triggered().await })
        .await?;

    tracing::info!("HTTP server stopped");
    if !shutdown.is_triggered() {
        shutdown.trigger();
    }
    services.stop().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
