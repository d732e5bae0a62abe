//! # Periodic Jobs
//!
//! Two independent timers drive the write path:
//!
//! | Job | Period | Calls |
//! |-----|--------|-------|
//! | batch | `batch.batch_delay_minutes` | [`BatchApi::submit_batch`] |
//! | confirmation | `confirmation.check_transaction_minutes` | [`ConfirmationApi::check_zonefiles`] |
//!
//! The first tick fires one full period after start. A failed cycle is logged
//! and the next tick runs as usual. Both loops stop when the shutdown channel
//! flips.

use sr_04_batch_engine::BatchApi;
use sr_05_confirmation::ConfirmationApi;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// Shortest period a timer accepts.
const MIN_PERIOD: Duration = Duration::from_millis(1);

pub struct Scheduler {
    batch: Arc<dyn BatchApi>,
    confirmation: Arc<dyn ConfirmationApi>,
    batch_interval: Duration,
    confirmation_interval: Duration,
}

impl Scheduler {
    pub fn new(
        batch: Arc<dyn BatchApi>,
        confirmation: Arc<dyn ConfirmationApi>,
        batch_interval: Duration,
        confirmation_interval: Duration,
    ) -> Self {
        Self {
            batch,
            confirmation,
            batch_interval,
            confirmation_interval,
        }
    }

    /// Spawn both timers. Handles finish once `shutdown` turns true.
    pub fn spawn(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let batch = self.batch.clone();
        let batch_job = spawn_periodic("batch", self.batch_interval, shutdown.clone(), move || {
            let batch = batch.clone();
            async move {
                debug!("Waking up to broadcast a batch");
                match batch.submit_batch().await {
                    Ok(Some(tx_id)) => info!(%tx_id, "Scheduled batch broadcast"),
                    Ok(None) => debug!("Nothing to batch"),
                    Err(e) => error!(error = %e, "Failed to broadcast batch."),
                }
            }
        });

        let confirmation = self.confirmation.clone();
        let confirmation_job = spawn_periodic(
            "confirmation",
            self.confirmation_interval,
            shutdown,
            move || {
                let confirmation = confirmation.clone();
                async move {
                    debug!("Waking up to check transaction statuses");
                    if let Err(e) = confirmation.check_zonefiles().await {
                        error!(error = %e, "Failed to check zonefile transaction status.");
                    }
                }
            },
        );

        vec![batch_job, confirmation_job]
    }
}

fn spawn_periodic<F, Fut>(
    job: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut cycle: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let period = period.max(MIN_PERIOD);
    let first_tick = Instant::now() + period;
    tokio::spawn(async move {
        let mut ticker = interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(job, period_secs = period.as_secs_f64(), "Timer started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => cycle().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!(job, "Timer stopped");
    })
}
