//! # Subdomain Registrar
//!
//! ## Startup Sequence
//!
//! 1. Install logging (`RUST_LOG`, default `info`)
//! 2. Load configuration (`SR_CONFIG` file, then `SR_*` overrides)
//! 3. Open the queue store and build the services
//! 4. Start the timers and the HTTP server
//! 5. Run until Ctrl+C, then drain

use anyhow::{Context, Result};
use registrar_runtime::container::RegistrarConfig;
use registrar_runtime::RegistrarRuntime;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = RegistrarConfig::load().context("loading registrar configuration")?;

    let runtime = RegistrarRuntime::new(config)?;
    let (server, _) = runtime.start().await?;

    info!("Registrar is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown();
    server.await.context("HTTP server task")?;
    info!("Shutdown complete");

    Ok(())
}
