//! # sr-02-queue-store
//!
//! Ordered, durable record store behind the registrar.
//!
//! ## Collections
//!
//! | Collection | Key | Mutation |
//! |------------|-----|----------|
//! | Queue records | `queue_index` (monotonic) | status only, never deleted |
//! | Submitter log | `queue_index` | append only |
//! | Zone-file backups | time of backup | append only |
//! | Tracked transactions | `tx_id` | height updates, removal on confirmation |
//!
//! A name's current status is its record with the highest `queue_index`.
//!
//! ## Adapters
//!
//! - [`InMemoryQueueStore`]: ordered maps behind a `parking_lot` lock.
//! - `RocksDbQueueStore` (feature `rocksdb`): column families per collection.
//!
//! Callers serialize mutation through the queue lock; the store only
//! guarantees that each call is atomic on its own.

pub mod adapters;
pub mod ports;

pub use adapters::memory::InMemoryQueueStore;
#[cfg(feature = "rocksdb")]
pub use adapters::rocksdb_adapter::{RocksDbConfig, RocksDbQueueStore};
pub use ports::store::{QueueStore, StoreResult, ZonefileBackup};
