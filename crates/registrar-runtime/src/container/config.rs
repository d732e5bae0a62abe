//! # Registrar Configuration
//!
//! Loaded from the JSON file named by `SR_CONFIG`, then overridden from the
//! environment, then validated. Every field has a default, so a partial file
//! is fine.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SR_DOMAIN_NAME` | `domain_name` |
//! | `SR_OWNER_KEY` | `owner_key` |
//! | `SR_PAYMENT_KEY` | `payment_key` |
//! | `SR_ADMIN_PASSWORD` | `http.admin_password` |
//! | `SR_HTTP_PORT` | `http.port` |
//! | `SR_DATA_DIR` | `storage.data_dir` |

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use shared_types::UriEntry;
use sr_03_admission::{is_valid_address, SpamPolicy, ValidationRules};
use sr_04_batch_engine::BatchConfig;
use sr_05_confirmation::ConfirmationConfig;
use sr_06_status::StatusConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the JSON config file.
pub const CONFIG_PATH_VAR: &str = "SR_CONFIG";

/// Complete registrar configuration.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrarConfig {
    /// Parent name subdomains are registered under.
    pub domain_name: String,
    /// Address expected to own `domain_name`.
    pub owner_address: String,
    pub owner_key: String,
    pub payment_key: String,
    /// Byte ceiling for a batch zone file.
    pub zonefile_max_bytes: usize,
    /// Published as an `_http._tcp` URI record in every batch.
    pub domain_uri: Option<String>,
    pub admission: AdmissionSettings,
    pub batch: BatchSettings,
    pub confirmation: ConfirmationSettings,
    /// Bounded wait for the queue lock.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "lock_timeout_ms")]
    pub lock_timeout: Duration,
    pub chain: ChainSettings,
    pub storage: StorageSettings,
    pub http: HttpSettings,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            domain_name: String::new(),
            owner_address: String::new(),
            owner_key: String::new(),
            payment_key: String::new(),
            zonefile_max_bytes: 4096,
            domain_uri: None,
            admission: AdmissionSettings::default(),
            batch: BatchSettings::default(),
            confirmation: ConfirmationSettings::default(),
            lock_timeout: shared_types::lock::DEFAULT_LOCK_TIMEOUT,
            chain: ChainSettings::default(),
            storage: StorageSettings::default(),
            http: HttpSettings::default(),
        }
    }
}

/// Admission policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionSettings {
    #[serde(flatten)]
    pub policy: SpamPolicy,
    pub name_min_length: Option<usize>,
    /// Reject names that are already live on chain.
    pub check_core_on_admission: bool,
}

/// Batch timer and sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub min_batch_size: usize,
    /// Re-check the chain for each queued name before batching.
    pub check_core_on_batching: bool,
    /// Minutes between batch attempts. Fractions allowed.
    pub batch_delay_minutes: f64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            min_batch_size: 1,
            check_core_on_batching: true,
            batch_delay_minutes: 15.0,
        }
    }
}

impl BatchSettings {
    pub fn interval(&self) -> Duration {
        minutes(self.batch_delay_minutes)
    }
}

/// Confirmation timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationSettings {
    /// Minutes between confirmation checks. Fractions allowed.
    pub check_transaction_minutes: f64,
    pub finalize_attempts: usize,
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            check_transaction_minutes: 5.0,
            finalize_attempts: 2,
        }
    }
}

impl ConfirmationSettings {
    pub fn interval(&self) -> Duration {
        minutes(self.check_transaction_minutes)
    }
}

/// Chain node endpoints.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    /// Naming API (`/v1/names`, `/v1/info`, `/v1/transactions`, `/v1/zonefile`).
    pub api_url: String,
    /// Builds, signs and broadcasts the name-update transaction.
    pub broadcast_url: String,
    /// Bound for every chain call made under the queue lock.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "call_timeout_ms")]
    pub call_timeout: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "connect_timeout_ms")]
    pub connect_timeout: Duration,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:6270".to_string(),
            broadcast_url: "http://localhost:16269/v1/broadcast/update".to_string(),
            call_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(2),
        }
    }
}

/// Queue store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Rocksdb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
    /// Warn at startup when free space on `data_dir` drops below this.
    pub min_disk_space_percent: u8,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
            min_disk_space_percent: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub host: IpAddr,
    pub port: u16,
    /// Bearer secret for the admin endpoints. Empty disables them.
    pub admin_password: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            admin_password: String::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value {value:?} for {var}")]
    InvalidOverride { var: &'static str, value: String },

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("owner_address {0} is not a valid address")]
    InvalidAddress(String),

    #[error("invalid interval: {0}")]
    InvalidInterval(&'static str),

    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}

impl RegistrarConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, or the file named by `SR_CONFIG`, with env overrides applied
    /// and validated.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SR_*` overrides using `lookup` to read variables.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(domain) = lookup("SR_DOMAIN_NAME") {
            self.domain_name = domain;
        }
        if let Some(key) = lookup("SR_OWNER_KEY") {
            self.owner_key = key;
        }
        if let Some(key) = lookup("SR_PAYMENT_KEY") {
            self.payment_key = key;
        }
        if let Some(password) = lookup("SR_ADMIN_PASSWORD") {
            self.http.admin_password = password;
        }
        if let Some(port) = lookup("SR_HTTP_PORT") {
            self.http.port = port.parse().map_err(|_| ConfigError::InvalidOverride {
                var: "SR_HTTP_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(dir) = lookup("SR_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain_name.is_empty() {
            return Err(ConfigError::Missing("domain_name"));
        }
        if self.owner_address.is_empty() {
            return Err(ConfigError::Missing("owner_address"));
        }
        if !is_valid_address(&self.owner_address) {
            return Err(ConfigError::InvalidAddress(self.owner_address.clone()));
        }
        if self.owner_key.is_empty() {
            return Err(ConfigError::Missing("owner_key"));
        }
        if self.payment_key.is_empty() {
            return Err(ConfigError::Missing("payment_key"));
        }

        if !is_positive(self.batch.batch_delay_minutes) {
            return Err(ConfigError::InvalidInterval("batch_delay_minutes must be > 0"));
        }
        if !is_positive(self.confirmation.check_transaction_minutes) {
            return Err(ConfigError::InvalidInterval(
                "check_transaction_minutes must be > 0",
            ));
        }
        if self.lock_timeout.is_zero() {
            return Err(ConfigError::InvalidInterval("lock_timeout_ms cannot be 0"));
        }
        if self.chain.call_timeout.is_zero() {
            return Err(ConfigError::InvalidInterval("call_timeout_ms cannot be 0"));
        }

        if self.zonefile_max_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "zonefile_max_bytes cannot be 0".into(),
            ));
        }
        if self.confirmation.finalize_attempts == 0 {
            return Err(ConfigError::InvalidLimit(
                "finalize_attempts cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// HTTP bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    pub fn uri_entries(&self) -> Vec<UriEntry> {
        self.domain_uri
            .iter()
            .map(|target| UriEntry::http_service(target.clone()))
            .collect()
    }

    fn rules(&self, check_chain: bool) -> ValidationRules {
        let mut rules = ValidationRules::new(self.domain_name.clone());
        rules.name_min_length = self.admission.name_min_length;
        rules.zonefile_max_bytes = self.zonefile_max_bytes;
        rules.uri_entries = self.uri_entries();
        rules.check_chain = check_chain;
        rules.chain_call_timeout = self.chain.call_timeout;
        rules
    }

    pub fn admission_rules(&self) -> ValidationRules {
        self.rules(self.admission.check_core_on_admission)
    }

    pub fn batch_config(&self) -> BatchConfig {
        let mut config = BatchConfig::new(
            self.rules(self.batch.check_core_on_batching),
            self.owner_address.clone(),
        );
        config.owner_key = self.owner_key.clone();
        config.payment_key = self.payment_key.clone();
        config.min_batch_size = self.batch.min_batch_size;
        config
    }

    pub fn confirmation_config(&self) -> ConfirmationConfig {
        ConfirmationConfig {
            finalize_attempts: self.confirmation.finalize_attempts,
            chain_call_timeout: self.chain.call_timeout,
        }
    }

    pub fn status_config(&self) -> StatusConfig {
        let mut config = StatusConfig::new(self.domain_name.clone());
        config.chain_call_timeout = self.chain.call_timeout;
        config.name_min_length = self.admission.name_min_length;
        config
    }
}

fn is_positive(minutes: f64) -> bool {
    minutes.is_finite() && minutes > 0.0
}

/// Longest timer period, matching a signed 32-bit millisecond count.
const MAX_INTERVAL: Duration = Duration::from_millis(i32::MAX as u64);

fn minutes(value: f64) -> Duration {
    let secs = (value * 60.0).clamp(0.0, MAX_INTERVAL.as_secs_f64());
    Duration::from_secs_f64(secs)
}
