//! Confirmation Tracker Service
//!
//! Reference: the tracked-transaction lifecycle in `sr-02-queue-store`.

use crate::domain::{is_confirmed, ConfirmationReport};
use crate::ports::inbound::ConfirmationApi;
use async_trait::async_trait;
use shared_types::{
    bounded, ChainClient, ChainCursor, ChainError, QueueLock, RegistrarResult, TrackedTransaction,
};
use sr_02_queue_store::QueueStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Confirmation configuration
#[derive(Clone, Debug)]
pub struct ConfirmationConfig {
    /// Times a confirmed zone file is republished. Publishing is idempotent.
    pub finalize_attempts: usize,
    pub chain_call_timeout: Duration,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            finalize_attempts: 2,
            chain_call_timeout: Duration::from_secs(10),
        }
    }
}

pub struct ConfirmationTracker {
    config: ConfirmationConfig,
    store: Arc<dyn QueueStore>,
    chain: Arc<dyn ChainClient>,
    lock: Arc<QueueLock>,
    cursor: Arc<ChainCursor>,
}

impl ConfirmationTracker {
    pub fn new(
        config: ConfirmationConfig,
        store: Arc<dyn QueueStore>,
        chain: Arc<dyn ChainClient>,
        lock: Arc<QueueLock>,
        cursor: Arc<ChainCursor>,
    ) -> Self {
        Self {
            config,
            store,
            chain,
            lock,
            cursor,
        }
    }

    /// Fill in inclusion heights. A rate limit stops further lookups for
    /// this cycle; any other lookup failure aborts it.
    async fn resolve_heights(
        &self,
        tracked: &mut [TrackedTransaction],
    ) -> Result<(), ChainError> {
        let limit = self.config.chain_call_timeout;
        for tx in tracked.iter_mut().filter(|tx| tx.block_height.is_none()) {
            let lookup = bounded(
                "get_tx_inclusion_height",
                limit,
                self.chain.get_tx_inclusion_height(&tx.tx_id),
            )
            .await;
            match lookup {
                Ok(height) => tx.block_height = height,
                Err(ChainError::RateLimited { endpoint }) => {
                    warn!(%endpoint, tx_id = %tx.tx_id, "Rate limited, resuming lookups next cycle");
                    break;
                }
                Err(e) => {
                    error!(tx_id = %tx.tx_id, error = %e, "Failed to look up transaction");
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    async fn finalize(&self, tx: &TrackedTransaction) -> Result<(), ChainError> {
        let limit = self.config.chain_call_timeout;
        for attempt in 1..=self.config.finalize_attempts.max(1) {
            bounded(
                "publish_zonefile",
                limit,
                self.chain.publish_zonefile(&tx.zonefile),
            )
            .await?;
            debug!(tx_id = %tx.tx_id, attempt, "Zone file published");
        }
        Ok(())
    }

    async fn run_cycle(&self) -> RegistrarResult<ConfirmationReport> {
        let _guard = self.lock.acquire().await?;

        let mut tracked = self.store.tracked_transactions()?;
        let mut report = ConfirmationReport::default();
        if tracked.is_empty() {
            return Ok(report);
        }

        // Heights learned so far survive a failed lookup or cursor refresh.
        let resolved = self.resolve_heights(&mut tracked).await;
        let known: Vec<TrackedTransaction> = tracked
            .iter()
            .filter(|tx| tx.block_height.is_some())
            .cloned()
            .collect();
        self.store.update_block_heights(&known)?;
        resolved?;

        let tip = self
            .cursor
            .refresh(self.chain.as_ref(), self.config.chain_call_timeout)
            .await?;

        for tx in &tracked {
            let Some(height) = tx.block_height else {
                report.pending.push(tx.tx_id.clone());
                continue;
            };
            if !is_confirmed(height, tip) {
                debug!(
                    tx_id = %tx.tx_id,
                    block_height = height,
                    confirmations = (tip + 1).saturating_sub(height),
                    "Awaiting confirmations"
                );
                report.unconfirmed.push(tx.tx_id.clone());
                continue;
            }
            match self.finalize(tx).await {
                Ok(()) => report.finalized.push(tx.tx_id.clone()),
                Err(e) => {
                    warn!(tx_id = %tx.tx_id, error = %e, "Failed to finalize, retrying next cycle");
                    report.failed.push(tx.tx_id.clone());
                }
            }
        }

        self.store.remove_tracked(&report.finalized)?;

        Ok(report)
    }
}

#[async_trait]
impl ConfirmationApi for ConfirmationTracker {
    async fn check_zonefiles(&self) -> RegistrarResult<ConfirmationReport> {
        let report = self.run_cycle().await?;
        if !report.is_empty() {
            info!(
                pending = report.pending.len(),
                unconfirmed = report.unconfirmed.len(),
                finalized = report.finalized.len(),
                failed = report.failed.len(),
                "Confirmation cycle complete"
            );
        }
        Ok(report)
    }
}
