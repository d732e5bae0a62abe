//! # Service Container
//!
//! Builds the queue store and the chain adapters, then the four services on
//! top of them. Every service shares one queue lock, and the batch engine and
//! confirmation tracker share one chain cursor.
//!
//! ```text
//! RegistrarConfig
//!       │
//!       ├── QueueStore (memory | rocksdb)
//!       ├── HttpChainClient, HttpProfileResolver
//!       │
//!       └── QueueLock + ChainCursor
//!             ├── AdmissionService
//!             ├── BatchEngine
//!             ├── ConfirmationTracker
//!             └── StatusResolver (no lock)
//! ```

use crate::adapters::{HttpChainClient, HttpProfileResolver};
use crate::container::config::{RegistrarConfig, StorageBackend, StorageSettings};
use anyhow::Context;
use fs2::FileExt;
use shared_types::{
    ChainClient, ChainCursor, ProfileResolver, QueueLock, SystemTimeSource, TimeSource,
};
use sr_02_queue_store::{InMemoryQueueStore, QueueStore};
use sr_03_admission::{AdmissionApi, AdmissionConfig, AdmissionService};
use sr_04_batch_engine::{BatchApi, BatchEngine};
use sr_05_confirmation::{ConfirmationApi, ConfirmationTracker};
use sr_06_status::{StatusApi, StatusResolver};
use std::fs::{self, File};
use std::sync::Arc;
use tracing::{info, warn};

/// Lock file guarding the data directory against a second registrar.
const DATA_LOCK_FILE: &str = "registrar.lock";

pub struct RegistrarContainer {
    pub config: RegistrarConfig,
    pub store: Arc<dyn QueueStore>,
    pub admission: Arc<dyn AdmissionApi>,
    pub batch: Arc<dyn BatchApi>,
    pub confirmation: Arc<dyn ConfirmationApi>,
    pub status: Arc<dyn StatusApi>,
    /// Held for the life of the process when the store is on disk.
    _data_lock: Option<File>,
}

impl RegistrarContainer {
    /// Open storage and connect the HTTP collaborators.
    pub fn build(config: RegistrarConfig) -> anyhow::Result<Self> {
        let (store, data_lock) = match config.storage.backend {
            StorageBackend::Memory => {
                warn!("Using in-memory queue store, registrations are lost on restart");
                let store: Arc<dyn QueueStore> = Arc::new(InMemoryQueueStore::new());
                (store, None)
            }
            StorageBackend::Rocksdb => {
                let lock = prepare_data_dir(&config.storage)?;
                (open_rocksdb(&config.storage)?, Some(lock))
            }
        };

        let chain: Arc<dyn ChainClient> =
            Arc::new(HttpChainClient::new(&config.chain).context("chain client")?);
        let profiles: Arc<dyn ProfileResolver> =
            Arc::new(HttpProfileResolver::new(&config.chain).context("profile resolver")?);

        let mut container =
            Self::with_collaborators(config, store, chain, profiles, Arc::new(SystemTimeSource));
        container._data_lock = data_lock;
        Ok(container)
    }

    /// Wire the services over caller-supplied collaborators.
    pub fn with_collaborators(
        config: RegistrarConfig,
        store: Arc<dyn QueueStore>,
        chain: Arc<dyn ChainClient>,
        profiles: Arc<dyn ProfileResolver>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let lock = Arc::new(QueueLock::new(config.lock_timeout));
        let cursor = Arc::new(ChainCursor::new());

        let admission = AdmissionService::new(
            AdmissionConfig {
                rules: config.admission_rules(),
                policy: config.admission.policy.clone(),
            },
            store.clone(),
            chain.clone(),
            profiles,
            lock.clone(),
            time.clone(),
        );
        let batch = BatchEngine::new(
            config.batch_config(),
            store.clone(),
            chain.clone(),
            lock.clone(),
            cursor.clone(),
            time.clone(),
        );
        let confirmation = ConfirmationTracker::new(
            config.confirmation_config(),
            store.clone(),
            chain.clone(),
            lock,
            cursor,
        );
        let status = StatusResolver::new(config.status_config(), store.clone(), chain, time);

        info!(
            domain = %config.domain_name,
            backend = ?config.storage.backend,
            "Registrar services wired"
        );

        Self {
            config,
            store,
            admission: Arc::new(admission),
            batch: Arc::new(batch),
            confirmation: Arc::new(confirmation),
            status: Arc::new(status),
            _data_lock: None,
        }
    }
}

/// Create the data directory, take its lock file and check free space.
fn prepare_data_dir(storage: &StorageSettings) -> anyhow::Result<File> {
    fs::create_dir_all(&storage.data_dir)
        .with_context(|| format!("creating {}", storage.data_dir.display()))?;

    let lock_path = storage.data_dir.join(DATA_LOCK_FILE);
    let lock = File::create(&lock_path)
        .with_context(|| format!("creating {}", lock_path.display()))?;
    lock.try_lock_exclusive()
        .with_context(|| format!("{} is in use by another registrar", storage.data_dir.display()))?;

    let available = fs2::available_space(&storage.data_dir)?;
    let total = fs2::total_space(&storage.data_dir)?;
    if total > 0 {
        let percent = ((available as f64 / total as f64) * 100.0) as u8;
        if percent < storage.min_disk_space_percent {
            warn!(
                data_dir = %storage.data_dir.display(),
                available_percent = percent,
                "Low disk space on data directory"
            );
        }
    }

    Ok(lock)
}

#[cfg(feature = "rocksdb")]
fn open_rocksdb(storage: &StorageSettings) -> anyhow::Result<Arc<dyn QueueStore>> {
    use sr_02_queue_store::{RocksDbConfig, RocksDbQueueStore};

    let path = storage.data_dir.join("queue");
    let config = RocksDbConfig {
        path: path.to_string_lossy().into_owned(),
        ..RocksDbConfig::default()
    };
    let store = RocksDbQueueStore::open(config)
        .with_context(|| format!("opening queue store at {}", path.display()))?;
    info!(path = %path.display(), "Opened RocksDB queue store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "rocksdb"))]
fn open_rocksdb(_storage: &StorageSettings) -> anyhow::Result<Arc<dyn QueueStore>> {
    anyhow::bail!("storage.backend is \"rocksdb\" but this build lacks the rocksdb feature")
}
