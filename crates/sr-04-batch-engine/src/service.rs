//! Batch Engine Service
//!
//! One cycle, entirely under the queue lock:
//!
//! ```text
//! fetch received ─→ revalidate ─→ min size? ─→ build zone file
//!                   (drop invalid,            │
//!                    keep received)           ▼
//!                          refresh cursor ─→ owner check ─→ backup
//!                                                             │
//!                    mark submitted ←── track tx ←── submit ◄─┘
//! ```
//!
//! A failure at any step aborts the cycle. Records are marked submitted only
//! after the chain accepted the transaction, so an aborted cycle at worst
//! leaves records `received` for the next attempt.

use crate::ports::inbound::BatchApi;
use async_trait::async_trait;
use shared_types::{
    bounded, ChainClient, ChainCursor, ChainError, InvalidReason, QueueLock, QueueRecord,
    QueueStatus, RegistrarError, RegistrarResult, SubdomainOperation, TimeSource,
    TrackedTransaction, TxId, UpdateRequest,
};
use sr_01_zonefile::{build_zonefile, BuiltZonefile, ZonefileError};
use sr_02_queue_store::QueueStore;
use sr_03_admission::{RegistrationValidator, ValidationRules};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Batch configuration
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Rules re-applied to every queued record. `check_chain` here is the
    /// batch-time registration re-check.
    pub rules: ValidationRules,
    /// Address expected to own the parent domain.
    pub owner_address: String,
    pub owner_key: String,
    pub payment_key: String,
    /// Fewest valid records worth a transaction. Zero behaves as one.
    pub min_batch_size: usize,
}

impl BatchConfig {
    pub fn new(rules: ValidationRules, owner_address: impl Into<String>) -> Self {
        Self {
            rules,
            owner_address: owner_address.into(),
            owner_key: String::new(),
            payment_key: String::new(),
            min_batch_size: 1,
        }
    }
}

pub struct BatchEngine {
    config: BatchConfig,
    validator: RegistrationValidator,
    store: Arc<dyn QueueStore>,
    chain: Arc<dyn ChainClient>,
    lock: Arc<QueueLock>,
    cursor: Arc<ChainCursor>,
    time: Arc<dyn TimeSource>,
}

impl BatchEngine {
    pub fn new(
        config: BatchConfig,
        store: Arc<dyn QueueStore>,
        chain: Arc<dyn ChainClient>,
        lock: Arc<QueueLock>,
        cursor: Arc<ChainCursor>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            validator: RegistrationValidator::new(config.rules.clone(), chain.clone()),
            config,
            store,
            chain,
            lock,
            cursor,
            time,
        }
    }

    fn domain_name(&self) -> &str {
        &self.config.rules.domain_name
    }

    /// Keep the records that are still valid. Invalid ones stay `received`.
    async fn revalidate(&self, batch_id: Uuid, queued: Vec<QueueRecord>) -> Vec<SubdomainOperation> {
        let mut valid = Vec::with_capacity(queued.len());
        for record in queued {
            match self.validator.validate(&record.operation).await {
                Ok(()) => valid.push(record.operation),
                Err(reason) => warn!(
                    %batch_id,
                    name = %record.operation.subdomain_name,
                    queue_index = record.queue_index,
                    %reason,
                    "Dropping queued registration that no longer validates"
                ),
            }
        }
        valid
    }

    fn build(&self, operations: &[SubdomainOperation]) -> RegistrarResult<BuiltZonefile> {
        let rules = &self.config.rules;
        build_zonefile(
            &rules.domain_name,
            &rules.uri_entries,
            operations,
            rules.zonefile_max_bytes,
        )
        .map_err(|e: ZonefileError| {
            warn!(domain = %rules.domain_name, error = %e, "Zone file headers leave no room for records");
            RegistrarError::invalid(&rules.domain_name, InvalidReason::ZonefileTooLarge)
        })
    }

    /// The registrar must still own the parent domain.
    async fn ensure_domain_owned(&self) -> Result<(), ChainError> {
        let limit = self.config.rules.chain_call_timeout;
        let info = bounded(
            "get_name_info",
            limit,
            self.chain.get_name_info(self.domain_name()),
        )
        .await?;

        match info {
            Some(info) if info.is_owned_by(&self.config.owner_address) => Ok(()),
            _ => Err(ChainError::NotOwner {
                domain: self.domain_name().to_string(),
                owner: self.config.owner_address.clone(),
            }),
        }
    }

    async fn submit(&self, zonefile: &str) -> Result<TxId, ChainError> {
        let request = UpdateRequest {
            domain_name: self.domain_name().to_string(),
            zonefile: zonefile.to_string(),
            owner_key: self.config.owner_key.clone(),
            payment_key: self.config.payment_key.clone(),
        };
        bounded(
            "submit_update_transaction",
            self.config.rules.chain_call_timeout,
            self.chain.submit_update_transaction(&request),
        )
        .await
    }

    async fn run_cycle(&self, batch_id: Uuid) -> RegistrarResult<Option<TxId>> {
        let _guard = self.lock.acquire().await?;

        let queued = self.store.fetch_received()?;
        if queued.is_empty() {
            debug!(%batch_id, "Queue empty");
            return Ok(None);
        }

        let queued_count = queued.len();
        let valid = self.revalidate(batch_id, queued).await;
        let minimum = self.config.min_batch_size.max(1);
        if valid.len() < minimum {
            info!(
                %batch_id,
                queued = queued_count,
                valid = valid.len(),
                minimum,
                "Not enough valid registrations for a batch"
            );
            return Ok(None);
        }

        let built = self.build(&valid)?;
        if built.is_empty() {
            warn!(%batch_id, "No registration fits in a zone file");
            return Ok(None);
        }

        let limit = self.config.rules.chain_call_timeout;
        self.cursor.refresh(self.chain.as_ref(), limit).await?;
        self.ensure_domain_owned().await?;

        self.store.backup_zonefile(&built.zonefile, self.time.now())?;

        let tx_id = self.submit(&built.zonefile).await?;
        info!(
            %batch_id,
            tx_id = %tx_id,
            names = built.included_names.len(),
            bytes = built.zonefile.len(),
            "Batch submitted"
        );

        self.store
            .track_transaction(&TrackedTransaction::new(tx_id.clone(), built.zonefile))?;
        self.store.update_status(
            &built.included_names,
            &QueueStatus::Submitted {
                tx_id: tx_id.clone(),
            },
        )?;

        Ok(Some(tx_id))
    }
}

#[async_trait]
impl BatchApi for BatchEngine {
    async fn submit_batch(&self) -> RegistrarResult<Option<TxId>> {
        let batch_id = Uuid::new_v4();
        let result = self.run_cycle(batch_id).await;
        if let Err(e) = &result {
            warn!(%batch_id, error = %e, "Batch cycle failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::testing::{
        MockChainClient, MockTimeSource, REGISTRAR_ADDRESS, TEST_ADDRESSES,
    };
    use sr_02_queue_store::InMemoryQueueStore;
    use std::time::Duration;

    const DOMAIN: &str = "foo.id";

    struct Harness {
        engine: BatchEngine,
        store: Arc<InMemoryQueueStore>,
        chain: Arc<MockChainClient>,
        lock: Arc<QueueLock>,
    }

    fn harness(configure: impl FnOnce(&mut BatchConfig)) -> Harness {
        let mut config = BatchConfig::new(ValidationRules::new(DOMAIN), REGISTRAR_ADDRESS);
        config.owner_key = "owner-key".into();
        config.payment_key = "payment-key".into();
        configure(&mut config);

        let store = Arc::new(InMemoryQueueStore::new());
        let chain = Arc::new(
            MockChainClient::new()
                .with_domain_owner(DOMAIN, REGISTRAR_ADDRESS)
                .with_chain_info(100, 100),
        );
        let lock = Arc::new(QueueLock::new(Duration::from_millis(200)));
        let engine = BatchEngine::new(
            config,
            store.clone(),
            chain.clone(),
            lock.clone(),
            Arc::new(ChainCursor::new()),
            Arc::new(MockTimeSource::new(5_000)),
        );
        Harness {
            engine,
            store,
            chain,
            lock,
        }
    }

    fn queue(store: &InMemoryQueueStore, names: &[&str]) {
        for (i, name) in names.iter().enumerate() {
            let op = SubdomainOperation::new_registration(*name, TEST_ADDRESSES[i], "hello-world");
            store.enqueue(&op, 1_000).unwrap();
        }
    }

    fn status(store: &InMemoryQueueStore, name: &str) -> QueueStatus {
        store.latest_for_name(name).unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_empty_queue_returns_none() {
        let h = harness(|_| {});
        assert_eq!(h.engine.submit_batch().await.unwrap(), None);
        assert!(h.chain.submitted().is_empty());
        assert!(h.store.zonefile_backups().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_below_minimum_returns_none() {
        let h = harness(|c| c.min_batch_size = 3);
        queue(&h.store, &["alpha", "bravo"]);

        assert_eq!(h.engine.submit_batch().await.unwrap(), None);
        assert_eq!(status(&h.store, "alpha"), QueueStatus::Received);
        assert_eq!(status(&h.store, "bravo"), QueueStatus::Received);
        assert!(h.chain.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_batch_marks_submitted_and_tracks() {
        let h = harness(|_| {});
        queue(&h.store, &["alpha", "bravo"]);

        let tx_id = h.engine.submit_batch().await.unwrap().unwrap();
        assert_eq!(tx_id, "tx-1");

        let submitted = QueueStatus::Submitted {
            tx_id: tx_id.clone(),
        };
        assert_eq!(status(&h.store, "alpha"), submitted);
        assert_eq!(status(&h.store, "bravo"), submitted);

        let requests = h.chain.submitted();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].domain_name, DOMAIN);
        assert_eq!(requests[0].owner_key, "owner-key");
        assert_eq!(requests[0].payment_key, "payment-key");
        assert!(requests[0].zonefile.starts_with("$ORIGIN foo.id\n"));
        assert!(requests[0].zonefile.contains("alpha\tIN\tTXT"));

        let tracked = h.store.tracked_transactions().unwrap();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].tx_id, tx_id);
        assert_eq!(tracked[0].zonefile, requests[0].zonefile);
        assert_eq!(tracked[0].block_height, None);

        let backups = h.store.zonefile_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].backed_up_at, 5_000);

        // Nothing left to send
        assert_eq!(h.engine.submit_batch().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overflow_leaves_rest_received() {
        // Headers are 25 bytes and each record line is 103-106 bytes here,
        // so a 300 byte ceiling admits two.
        let h = harness(|c| c.rules.zonefile_max_bytes = 300);
        queue(&h.store, &["alpha", "bravo", "charlie"]);

        let tx_id = h.engine.submit_batch().await.unwrap().unwrap();
        assert_eq!(status(&h.store, "alpha").tx_id(), Some(tx_id.as_str()));
        assert_eq!(status(&h.store, "bravo").tx_id(), Some(tx_id.as_str()));
        assert_eq!(status(&h.store, "charlie"), QueueStatus::Received);

        let next = h.engine.submit_batch().await.unwrap().unwrap();
        assert_ne!(next, tx_id);
        assert_eq!(status(&h.store, "charlie").tx_id(), Some(next.as_str()));
    }

    #[tokio::test]
    async fn test_invalid_records_dropped_but_kept_received() {
        let h = harness(|c| c.rules.check_chain = true);
        queue(&h.store, &["alpha", "bravo"]);
        h.chain.register_subdomain("bravo.foo.id", TEST_ADDRESSES[5]);

        let tx_id = h.engine.submit_batch().await.unwrap().unwrap();
        assert_eq!(status(&h.store, "alpha").tx_id(), Some(tx_id.as_str()));
        assert_eq!(status(&h.store, "bravo"), QueueStatus::Received);
        assert!(!h.chain.submitted()[0].zonefile.contains("bravo"));
    }

    #[tokio::test]
    async fn test_rejection_surfaces_reason_verbatim() {
        let h = harness(|_| {});
        queue(&h.store, &["alpha"]);
        h.chain.reject_submissions("Insufficient funds for fee");

        let err = h.engine.submit_batch().await.unwrap_err();
        assert_eq!(err.to_string(), "Insufficient funds for fee");
        assert!(!err.is_retryable());
        assert_eq!(status(&h.store, "alpha"), QueueStatus::Received);
        assert!(h.store.tracked_transactions().unwrap().is_empty());
        // Backup precedes submission
        assert_eq!(h.store.zonefile_backups().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_not_owner_leaves_records_queued() {
        let h = harness(|c| c.owner_address = TEST_ADDRESSES[9].to_string());
        queue(&h.store, &["alpha"]);

        let err = h.engine.submit_batch().await.unwrap_err();
        assert!(matches!(
            err,
            RegistrarError::Chain(ChainError::NotOwner { .. })
        ));
        assert!(err.to_string().starts_with("Domain name foo.id not owned by"));
        assert_eq!(status(&h.store, "alpha"), QueueStatus::Received);
        assert!(h.chain.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_stale_source_aborts() {
        let h = harness(|_| {});
        h.chain.set_chain_info(120, 100);
        queue(&h.store, &["alpha"]);

        let err = h.engine.submit_batch().await.unwrap_err();
        assert!(matches!(
            err,
            RegistrarError::Chain(ChainError::StaleSource { .. })
        ));
        assert_eq!(status(&h.store, "alpha"), QueueStatus::Received);
        assert!(h.chain.submitted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_held_times_out() {
        let h = harness(|_| {});
        queue(&h.store, &["alpha"]);
        let _held = h.lock.acquire().await.unwrap();

        let err = h.engine.submit_batch().await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to obtain lock"));
        assert_eq!(status(&h.store, "alpha"), QueueStatus::Received);
    }
}
