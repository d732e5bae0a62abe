//! Queue store port.

use serde::{Deserialize, Serialize};
use shared_types::{
    QueueIndex, QueueRecord, QueueStatus, StoreError, SubdomainOperation, SubmitterRecord,
    Timestamp, TrackedTransaction, TxId,
};

pub type StoreResult<T> = Result<T, StoreError>;

/// An archived batch zone file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonefileBackup {
    pub zonefile: String,
    pub backed_up_at: Timestamp,
}

/// Persistence for queue records, the submitter log and tracked transactions.
///
/// Every method is atomic on its own. Check-then-act sequences are the
/// caller's responsibility (the queue lock).
pub trait QueueStore: Send + Sync {
    /// Insert a `Received` record and return its assigned index.
    fn enqueue(&self, op: &SubdomainOperation, received_at: Timestamp) -> StoreResult<QueueIndex>;

    /// Most recent record for `name`, by `queue_index`.
    fn latest_for_name(&self, name: &str) -> StoreResult<Option<QueueRecord>>;

    /// Set the status of one record.
    fn set_status(&self, queue_index: QueueIndex, status: &QueueStatus) -> StoreResult<()>;

    /// Set the status of each name's most recent record. Unknown names are skipped.
    fn update_status(&self, names: &[String], status: &QueueStatus) -> StoreResult<()>;

    /// All `Received` records, oldest first.
    fn fetch_received(&self) -> StoreResult<Vec<QueueRecord>>;

    /// Up to `limit` records with `queue_index >= from_index` and
    /// `received_at >= received_since`, ordered by index.
    fn list(
        &self,
        from_index: QueueIndex,
        received_since: Timestamp,
        limit: usize,
    ) -> StoreResult<Vec<QueueRecord>>;

    fn log_submitter(&self, record: &SubmitterRecord) -> StoreResult<()>;

    /// Submitter-log entries for `owner`.
    fn count_by_owner(&self, owner: &str) -> StoreResult<u64>;

    /// Submitter-log entries for `ip_address`.
    fn count_by_ip(&self, ip_address: &str) -> StoreResult<u64>;

    fn backup_zonefile(&self, zonefile: &str, at: Timestamp) -> StoreResult<()>;

    /// Archived zone files, oldest first. For audit tooling.
    fn zonefile_backups(&self) -> StoreResult<Vec<ZonefileBackup>>;

    /// Start tracking a broadcast batch. Re-tracking an id replaces it.
    fn track_transaction(&self, tx: &TrackedTransaction) -> StoreResult<()>;

    fn tracked_transactions(&self) -> StoreResult<Vec<TrackedTransaction>>;

    /// Persist `block_height` for each already-tracked transaction.
    fn update_block_heights(&self, txs: &[TrackedTransaction]) -> StoreResult<()>;

    fn remove_tracked(&self, tx_ids: &[TxId]) -> StoreResult<()>;
}
