//! # Registrar Runtime
//!
//! Wires the registrar components into one process: HTTP API in front,
//! two timers behind, a shared queue store underneath.
//!
//! ```text
//!   POST /register ──→ AdmissionService ──┐
//!                                         │
//!   batch timer ─────→ BatchEngine ───────┼──→ QueueStore
//!   POST /issue_batch ─┘                  │        │
//!                                         │        │
//!   confirm timer ───→ ConfirmationTracker┘        │
//!   POST /check_zonefiles ─┘                       │
//!                                                  │
//!   GET /status, /list, /v1/names ─→ StatusResolver┘
//!
//!   BatchEngine, ConfirmationTracker, admission checks ──→ chain node (HTTP)
//! ```
//!
//! ## Modules
//!
//! - `container/` - configuration and service wiring
//! - `adapters/` - HTTP clients for the chain node and profile lookups
//! - `api/` - axum router and handlers
//! - `scheduler` - batch and confirmation timers

pub mod adapters;
pub mod api;
pub mod container;
pub mod scheduler;

use crate::api::{build_router, AppState};
use crate::container::{RegistrarConfig, RegistrarContainer};
use crate::scheduler::Scheduler;
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub use container::ConfigError;

/// The running registrar.
pub struct RegistrarRuntime {
    container: Arc<RegistrarContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl RegistrarRuntime {
    /// Open storage and build every service.
    pub fn new(config: RegistrarConfig) -> anyhow::Result<Self> {
        info!(domain = %config.domain_name, "Creating registrar runtime");
        let container = RegistrarContainer::build(config)?;
        Ok(Self::with_container(container))
    }

    pub fn with_container(container: RegistrarContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Start the timers and bind the HTTP server.
    ///
    /// Returns the server task and the bound address. The server drains and
    /// exits after [`shutdown`](Self::shutdown).
    pub async fn start(&self) -> anyhow::Result<(JoinHandle<()>, SocketAddr)> {
        let config = &self.container.config;

        let scheduler = Scheduler::new(
            self.container.batch.clone(),
            self.container.confirmation.clone(),
            config.batch.interval(),
            config.confirmation.interval(),
        );
        scheduler.spawn(self.shutdown_rx.clone());

        let addr = config.http_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding {}", addr))?;
        let local_addr = listener.local_addr()?;

        let router = build_router(AppState::from_container(&self.container));
        let mut shutdown = self.shutdown_rx.clone();
        let server = tokio::spawn(async move {
            let result = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                while !*shutdown.borrow() {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await;
            if let Err(e) = result {
                error!(error = %e, "HTTP server failed");
            }
        });

        info!(addr = %local_addr, "Registrar listening");
        Ok((server, local_addr))
    }

    /// Signal the timers and the HTTP server to stop.
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
    }

    pub fn container(&self) -> Arc<RegistrarContainer> {
        Arc::clone(&self.container)
    }
}
