//! # RocksDB Queue Store
//!
//! Durable `QueueStore` over RocksDB.
//!
//! ## Column Families
//!
//! - `queue` - `queue_index` (big-endian) → bincode `QueueRecord`
//! - `names` - name → latest `queue_index`
//! - `received` - `queue_index` → empty, for records still `Received`
//! - `owner_log` / `ip_log` - `key 0x00 queue_index` → empty, for counts
//! - `backups` - backup sequence → bincode `ZonefileBackup`
//! - `tracked` - tracking sequence → bincode `TrackedTransaction`
//! - `meta` - counters
//!
//! Writes take the outer write lock so counter reads and the batch that
//! bumps them are atomic.

use crate::ports::store::{QueueStore, StoreResult, ZonefileBackup};
use parking_lot::RwLock;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    QueueIndex, QueueRecord, QueueStatus, StoreError, SubdomainOperation, SubmitterRecord,
    Timestamp, TrackedTransaction, TxId,
};
use std::sync::Arc;
use tracing::info;

pub const CF_QUEUE: &str = "queue";
pub const CF_NAMES: &str = "names";
pub const CF_RECEIVED: &str = "received";
pub const CF_OWNER_LOG: &str = "owner_log";
pub const CF_IP_LOG: &str = "ip_log";
pub const CF_BACKUPS: &str = "backups";
pub const CF_TRACKED: &str = "tracked";
pub const CF_META: &str = "meta";

pub const COLUMN_FAMILIES: &[&str] = &[
    CF_QUEUE,
    CF_NAMES,
    CF_RECEIVED,
    CF_OWNER_LOG,
    CF_IP_LOG,
    CF_BACKUPS,
    CF_TRACKED,
    CF_META,
];

const META_LAST_INDEX: &[u8] = b"last_queue_index";
const META_LAST_BACKUP: &[u8] = b"last_backup";
const META_LAST_TRACKED: &[u8] = b"last_tracked";

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/registrar".to_string(),
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            write_buffer_size: 1024 * 1024,
            sync_writes: false,
        }
    }
}

pub struct RocksDbQueueStore {
    db: Arc<RwLock<DB>>,
    config: RocksDbConfig,
}

impl RocksDbQueueStore {
    /// Open or create the database
    pub fn open(config: RocksDbConfig) -> StoreResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| StoreError::Database(format!("Failed to open RocksDB: {}", e)))?;
        info!(path = %config.path, "Opened queue store");

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
            config,
        })
    }

    fn write_opts(&self) -> rocksdb::WriteOptions {
        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }

    fn commit(&self, db: &DB, batch: WriteBatch) -> StoreResult<()> {
        db.write_opt(batch, &self.write_opts())
            .map_err(|e| StoreError::Database(format!("RocksDB batch write failed: {}", e)))
    }
}

fn cf<'a>(db: &'a DB, name: &str) -> StoreResult<&'a ColumnFamily> {
    db.cf_handle(name)
        .ok_or_else(|| StoreError::Database(format!("missing column family {}", name)))
}

fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn read_u64(bytes: &[u8]) -> StoreResult<u64> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::Serialization("expected 8-byte integer".to_string()))?;
    Ok(u64::from_be_bytes(array))
}

/// `key 0x00 queue_index` so one key's entries share a prefix.
fn log_key(key: &str, queue_index: QueueIndex) -> Vec<u8> {
    let mut out = Vec::with_capacity(key.len() + 9);
    out.extend_from_slice(key.as_bytes());
    out.push(0);
    out.extend_from_slice(&queue_index.to_be_bytes());
    out
}

fn log_prefix(key: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(key.len() + 1);
    out.extend_from_slice(key.as_bytes());
    out.push(0);
    out
}

fn next_counter(db: &DB, meta: &ColumnFamily, key: &[u8]) -> StoreResult<u64> {
    let current = match db
        .get_cf(meta, key)
        .map_err(|e| StoreError::Database(format!("RocksDB get failed: {}", e)))?
    {
        Some(bytes) => read_u64(&bytes)?,
        None => 0,
    };
    Ok(current + 1)
}

fn get_record(db: &DB, queue_index: QueueIndex) -> StoreResult<Option<QueueRecord>> {
    db.get_cf(cf(db, CF_QUEUE)?, queue_index.to_be_bytes())
        .map_err(|e| StoreError::Database(format!("RocksDB get failed: {}", e)))?
        .map(|bytes| decode(&bytes))
        .transpose()
}

fn latest_index(db: &DB, name: &str) -> StoreResult<Option<QueueIndex>> {
    db.get_cf(cf(db, CF_NAMES)?, name.as_bytes())
        .map_err(|e| StoreError::Database(format!("RocksDB get failed: {}", e)))?
        .map(|bytes| read_u64(&bytes))
        .transpose()
}

/// Stage a status change, keeping the `received` index in step.
fn stage_status(db: &DB, batch: &mut WriteBatch, mut record: QueueRecord, status: &QueueStatus) -> StoreResult<()> {
    let key = record.queue_index.to_be_bytes();
    record.status = status.clone();
    batch.put_cf(cf(db, CF_QUEUE)?, key, encode(&record)?);
    if status.is_received() {
        batch.put_cf(cf(db, CF_RECEIVED)?, key, b"");
    } else {
        batch.delete_cf(cf(db, CF_RECEIVED)?, key);
    }
    Ok(())
}

fn scan_values<T: DeserializeOwned>(db: &DB, family: &str) -> StoreResult<Vec<T>> {
    let mut out = Vec::new();
    for item in db.iterator_cf(cf(db, family)?, IteratorMode::Start) {
        let (_, value) =
            item.map_err(|e| StoreError::Database(format!("RocksDB scan failed: {}", e)))?;
        out.push(decode(&value)?);
    }
    Ok(out)
}

fn count_prefix(db: &DB, family: &str, prefix: &[u8]) -> StoreResult<u64> {
    let mut count = 0;
    for item in db.iterator_cf(cf(db, family)?, IteratorMode::From(prefix, Direction::Forward)) {
        let (key, _) =
            item.map_err(|e| StoreError::Database(format!("RocksDB scan failed: {}", e)))?;
        if !key.starts_with(prefix) {
            break;
        }
        count += 1;
    }
    Ok(count)
}

/// Tracking-sequence key of `tx_id`, if tracked.
fn tracked_key(db: &DB, tx_id: &str) -> StoreResult<Option<(Box<[u8]>, TrackedTransaction)>> {
    for item in db.iterator_cf(cf(db, CF_TRACKED)?, IteratorMode::Start) {
        let (key, value) =
            item.map_err(|e| StoreError::Database(format!("RocksDB scan failed: {}", e)))?;
        let tx: TrackedTransaction = decode(&value)?;
        if tx.tx_id == tx_id {
            return Ok(Some((key, tx)));
        }
    }
    Ok(None)
}

impl QueueStore for RocksDbQueueStore {
    fn enqueue(&self, op: &SubdomainOperation, received_at: Timestamp) -> StoreResult<QueueIndex> {
        let db = self.db.write();
        let meta = cf(&db, CF_META)?;
        let queue_index = next_counter(&db, meta, META_LAST_INDEX)?;
        let key = queue_index.to_be_bytes();

        let record = QueueRecord {
            queue_index,
            operation: op.clone(),
            status: QueueStatus::Received,
            received_at,
        };

        let mut batch = WriteBatch::default();
        batch.put_cf(cf(&db, CF_QUEUE)?, key, encode(&record)?);
        batch.put_cf(cf(&db, CF_NAMES)?, op.subdomain_name.as_bytes(), key);
        batch.put_cf(cf(&db, CF_RECEIVED)?, key, b"");
        batch.put_cf(meta, META_LAST_INDEX, key);
        self.commit(&db, batch)?;

        Ok(queue_index)
    }

    fn latest_for_name(&self, name: &str) -> StoreResult<Option<QueueRecord>> {
        let db = self.db.read();
        match latest_index(&db, name)? {
            Some(index) => get_record(&db, index),
            None => Ok(None),
        }
    }

    fn set_status(&self, queue_index: QueueIndex, status: &QueueStatus) -> StoreResult<()> {
        let db = self.db.write();
        let record = get_record(&db, queue_index)?
            .ok_or_else(|| StoreError::NotFound(format!("queue index {}", queue_index)))?;
        let mut batch = WriteBatch::default();
        stage_status(&db, &mut batch, record, status)?;
        self.commit(&db, batch)
    }

    fn update_status(&self, names: &[String], status: &QueueStatus) -> StoreResult<()> {
        let db = self.db.write();
        let mut batch = WriteBatch::default();
        for name in names {
            let Some(index) = latest_index(&db, name)? else {
                continue;
            };
            if let Some(record) = get_record(&db, index)? {
                stage_status(&db, &mut batch, record, status)?;
            }
        }
        self.commit(&db, batch)
    }

    fn fetch_received(&self) -> StoreResult<Vec<QueueRecord>> {
        let db = self.db.read();
        let mut out = Vec::new();
        for item in db.iterator_cf(cf(&db, CF_RECEIVED)?, IteratorMode::Start) {
            let (key, _) =
                item.map_err(|e| StoreError::Database(format!("RocksDB scan failed: {}", e)))?;
            if let Some(record) = get_record(&db, read_u64(&key)?)? {
                out.push(record);
            }
        }
        Ok(out)
    }

    fn list(
        &self,
        from_index: QueueIndex,
        received_since: Timestamp,
        limit: usize,
    ) -> StoreResult<Vec<QueueRecord>> {
        let db = self.db.read();
        let start = from_index.to_be_bytes();
        let mut out = Vec::new();
        for item in db.iterator_cf(
            cf(&db, CF_QUEUE)?,
            IteratorMode::From(&start, Direction::Forward),
        ) {
            if out.len() >= limit {
                break;
            }
            let (_, value) =
                item.map_err(|e| StoreError::Database(format!("RocksDB scan failed: {}", e)))?;
            let record: QueueRecord = decode(&value)?;
            if record.received_at >= received_since {
                out.push(record);
            }
        }
        Ok(out)
    }

    fn log_submitter(&self, record: &SubmitterRecord) -> StoreResult<()> {
        let db = self.db.write();
        let mut batch = WriteBatch::default();
        batch.put_cf(
            cf(&db, CF_OWNER_LOG)?,
            log_key(&record.owner, record.queue_index),
            b"",
        );
        if let Some(ip) = &record.ip_address {
            batch.put_cf(cf(&db, CF_IP_LOG)?, log_key(ip, record.queue_index), b"");
        }
        self.commit(&db, batch)
    }

    fn count_by_owner(&self, owner: &str) -> StoreResult<u64> {
        let db = self.db.read();
        count_prefix(&db, CF_OWNER_LOG, &log_prefix(owner))
    }

    fn count_by_ip(&self, ip_address: &str) -> StoreResult<u64> {
        let db = self.db.read();
        count_prefix(&db, CF_IP_LOG, &log_prefix(ip_address))
    }

    fn backup_zonefile(&self, zonefile: &str, at: Timestamp) -> StoreResult<()> {
        let db = self.db.write();
        let meta = cf(&db, CF_META)?;
        let seq = next_counter(&db, meta, META_LAST_BACKUP)?.to_be_bytes();
        let backup = ZonefileBackup {
            zonefile: zonefile.to_string(),
            backed_up_at: at,
        };
        let mut batch = WriteBatch::default();
        batch.put_cf(cf(&db, CF_BACKUPS)?, seq, encode(&backup)?);
        batch.put_cf(meta, META_LAST_BACKUP, seq);
        self.commit(&db, batch)
    }

    fn zonefile_backups(&self) -> StoreResult<Vec<ZonefileBackup>> {
        let db = self.db.read();
        scan_values(&db, CF_BACKUPS)
    }

    fn track_transaction(&self, tx: &TrackedTransaction) -> StoreResult<()> {
        let db = self.db.write();
        let meta = cf(&db, CF_META)?;
        let mut batch = WriteBatch::default();
        match tracked_key(&db, &tx.tx_id)? {
            Some((key, _)) => batch.put_cf(cf(&db, CF_TRACKED)?, key, encode(tx)?),
            None => {
                let seq = next_counter(&db, meta, META_LAST_TRACKED)?.to_be_bytes();
                batch.put_cf(cf(&db, CF_TRACKED)?, seq, encode(tx)?);
                batch.put_cf(meta, META_LAST_TRACKED, seq);
            }
        }
        self.commit(&db, batch)
    }

    fn tracked_transactions(&self) -> StoreResult<Vec<TrackedTransaction>> {
        let db = self.db.read();
        scan_values(&db, CF_TRACKED)
    }

    fn update_block_heights(&self, txs: &[TrackedTransaction]) -> StoreResult<()> {
        let db = self.db.write();
        let mut batch = WriteBatch::default();
        for update in txs {
            if let Some((key, mut tracked)) = tracked_key(&db, &update.tx_id)? {
                tracked.block_height = update.block_height;
                batch.put_cf(cf(&db, CF_TRACKED)?, key, encode(&tracked)?);
            }
        }
        self.commit(&db, batch)
    }

    fn remove_tracked(&self, tx_ids: &[TxId]) -> StoreResult<()> {
        let db = self.db.write();
        let mut batch = WriteBatch::default();
        for tx_id in tx_ids {
            if let Some((key, _)) = tracked_key(&db, tx_id)? {
                batch.delete_cf(cf(&db, CF_TRACKED)?, key);
            }
        }
        self.commit(&db, batch)
    }
}
