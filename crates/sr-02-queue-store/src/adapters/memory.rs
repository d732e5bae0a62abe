//! In-memory queue store for tests and single-run deployments.

use crate::ports::store::{QueueStore, StoreResult, ZonefileBackup};
use parking_lot::RwLock;
use shared_types::{
    QueueIndex, QueueRecord, QueueStatus, SubdomainOperation, SubmitterRecord, Timestamp,
    TrackedTransaction, TxId,
};
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
struct MemoryState {
    queue: BTreeMap<QueueIndex, QueueRecord>,
    last_index: QueueIndex,
    latest_by_name: HashMap<String, QueueIndex>,
    submitters: Vec<SubmitterRecord>,
    backups: Vec<ZonefileBackup>,
    /// Insertion order is tracking order.
    tracked: Vec<TrackedTransaction>,
}

#[derive(Default)]
pub struct InMemoryQueueStore {
    state: RwLock<MemoryState>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state.read().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueueStore for InMemoryQueueStore {
    fn enqueue(&self, op: &SubdomainOperation, received_at: Timestamp) -> StoreResult<QueueIndex> {
        let mut state = self.state.write();
        state.last_index += 1;
        let queue_index = state.last_index;
        state.queue.insert(
            queue_index,
            QueueRecord {
                queue_index,
                operation: op.clone(),
                status: QueueStatus::Received,
                received_at,
            },
        );
        state
            .latest_by_name
            .insert(op.subdomain_name.clone(), queue_index);
        Ok(queue_index)
    }

    fn latest_for_name(&self, name: &str) -> StoreResult<Option<QueueRecord>> {
        let state = self.state.read();
        Ok(state
            .latest_by_name
            .get(name)
            .and_then(|index| state.queue.get(index))
            .cloned())
    }

    fn set_status(&self, queue_index: QueueIndex, status: &QueueStatus) -> StoreResult<()> {
        let mut state = self.state.write();
        match state.queue.get_mut(&queue_index) {
            Some(record) => {
                record.status = status.clone();
                Ok(())
            }
            None => Err(shared_types::StoreError::NotFound(format!(
                "queue index {}",
                queue_index
            ))),
        }
    }

    fn update_status(&self, names: &[String], status: &QueueStatus) -> StoreResult<()> {
        let mut state = self.state.write();
        let MemoryState {
            queue,
            latest_by_name,
            ..
        } = &mut *state;
        for name in names {
            if let Some(record) = latest_by_name.get(name).and_then(|i| queue.get_mut(i)) {
                record.status = status.clone();
            }
        }
        Ok(())
    }

    fn fetch_received(&self) -> StoreResult<Vec<QueueRecord>> {
        Ok(self
            .state
            .read()
            .queue
            .values()
            .filter(|r| r.status.is_received())
            .cloned()
            .collect())
    }

    fn list(
        &self,
        from_index: QueueIndex,
        received_since: Timestamp,
        limit: usize,
    ) -> StoreResult<Vec<QueueRecord>> {
        Ok(self
            .state
            .read()
            .queue
            .range(from_index..)
            .map(|(_, r)| r)
            .filter(|r| r.received_at >= received_since)
            .take(limit)
            .cloned()
            .collect())
    }

    fn log_submitter(&self, record: &SubmitterRecord) -> StoreResult<()> {
        self.state.write().submitters.push(record.clone());
        Ok(())
    }

    fn count_by_owner(&self, owner: &str) -> StoreResult<u64> {
        Ok(self
            .state
            .read()
            .submitters
            .iter()
            .filter(|s| s.owner == owner)
            .count() as u64)
    }

    fn count_by_ip(&self, ip_address: &str) -> StoreResult<u64> {
        Ok(self
            .state
            .read()
            .submitters
            .iter()
            .filter(|s| s.ip_address.as_deref() == Some(ip_address))
            .count() as u64)
    }

    fn backup_zonefile(&self, zonefile: &str, at: Timestamp) -> StoreResult<()> {
        self.state.write().backups.push(ZonefileBackup {
            zonefile: zonefile.to_string(),
            backed_up_at: at,
        });
        Ok(())
    }

    fn zonefile_backups(&self) -> StoreResult<Vec<ZonefileBackup>> {
        Ok(self.state.read().backups.clone())
    }

    fn track_transaction(&self, tx: &TrackedTransaction) -> StoreResult<()> {
        let mut state = self.state.write();
        match state.tracked.iter_mut().find(|t| t.tx_id == tx.tx_id) {
            Some(existing) => *existing = tx.clone(),
            None => state.tracked.push(tx.clone()),
        }
        Ok(())
    }

    fn tracked_transactions(&self) -> StoreResult<Vec<TrackedTransaction>> {
        Ok(self.state.read().tracked.clone())
    }

    fn update_block_heights(&self, txs: &[TrackedTransaction]) -> StoreResult<()> {
        let mut state = self.state.write();
        for update in txs {
            if let Some(tracked) = state.tracked.iter_mut().find(|t| t.tx_id == update.tx_id) {
                tracked.block_height = update.block_height;
            }
        }
        Ok(())
    }

    fn remove_tracked(&self, tx_ids: &[TxId]) -> StoreResult<()> {
        self.state
            .write()
            .tracked
            .retain(|t| !tx_ids.contains(&t.tx_id));
        Ok(())
    }
}
