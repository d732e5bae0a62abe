//! In-memory fakes of the collaborator ports, shared by every crate's tests.

use crate::chain::{ChainClient, ChainInfo, NameInfo, Profile, ProfileResolver, ProofCheck, UpdateRequest};
use crate::entities::{Timestamp, TxId};
use crate::errors::ChainError;
use crate::time::TimeSource;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Distinct mainnet addresses with valid checksums.
pub const TEST_ADDRESSES: [&str; 10] = [
    "SPG2081040G2081040G2081040G208107P280EP",
    "SP1040G2081040G2081040G2081040G20ABNMJC0",
    "SP1G60R30C1G60R30C1G60R30C1G60R30ENX4GX2",
    "SP2081040G2081040G2081040G2081040JQWQ3V0",
    "SP2GA1850M2GA1850M2GA1850M2GA1850PR5YCG7",
    "SP30C1G60R30C1G60R30C1G60R30C1G60REGTW76",
    "SP3GE1R70W3GE1R70W3GE1R70W3GE1R70Z5ESEBQ",
    "SP40G2081040G2081040G2081040G208120R0WSM",
    "SP4GJ289144GJ289144GJ289144GJ28916ETMJNQ",
    "SP50M2GA1850M2GA1850M2GA1850M2GA19FXZ1V5",
];

/// Address used as the registrar's own domain owner in tests.
pub const REGISTRAR_ADDRESS: &str = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";

#[derive(Default)]
struct ChainState {
    names: HashMap<String, NameInfo>,
    chain_info: Option<ChainInfo>,
    tx_heights: HashMap<String, u64>,
    rejection: Option<String>,
    failing_publishes: HashSet<String>,
    name_lookup_error: Option<ChainError>,
    tx_lookup_error: Option<ChainError>,
    tx_lookup_errors: HashMap<String, ChainError>,
    submitted: Vec<UpdateRequest>,
    published: Vec<String>,
}

/// Scriptable chain client.
#[derive(Default)]
pub struct MockChainClient {
    state: Mutex<ChainState>,
    next_tx: AtomicU64,
    name_lookups: AtomicUsize,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `domain` as owned by `owner`.
    pub fn with_domain_owner(self, domain: &str, owner: &str) -> Self {
        self.set_name(
            domain,
            NameInfo {
                address: Some(owner.to_string()),
                status: None,
            },
        );
        self
    }

    pub fn with_chain_info(self, tip_height: u64, indexed_height: u64) -> Self {
        self.set_chain_info(tip_height, indexed_height);
        self
    }

    pub fn set_name(&self, fq_name: &str, info: NameInfo) {
        self.state.lock().names.insert(fq_name.to_string(), info);
    }

    /// Mark `fq_name` live on the naming network.
    pub fn register_subdomain(&self, fq_name: &str, owner: &str) {
        self.set_name(
            fq_name,
            NameInfo {
                address: Some(owner.to_string()),
                status: Some(crate::chain::REGISTERED_SUBDOMAIN_STATUS.to_string()),
            },
        );
    }

    pub fn set_chain_info(&self, tip_height: u64, indexed_height: u64) {
        self.state.lock().chain_info = Some(ChainInfo {
            tip_height,
            indexed_height,
        });
    }

    pub fn include_tx(&self, tx_id: &str, height: u64) {
        self.state.lock().tx_heights.insert(tx_id.to_string(), height);
    }

    pub fn reject_submissions(&self, reason: &str) {
        self.state.lock().rejection = Some(reason.to_string());
    }

    pub fn fail_publish(&self, zonefile: &str) {
        self.state
            .lock()
            .failing_publishes
            .insert(zonefile.to_string());
    }

    pub fn fail_name_lookups(&self, error: ChainError) {
        self.state.lock().name_lookup_error = Some(error);
    }

    pub fn fail_tx_lookups(&self, error: ChainError) {
        self.state.lock().tx_lookup_error = Some(error);
    }

    /// Fail lookups of a single transaction.
    pub fn fail_tx_lookup(&self, tx_id: &str, error: ChainError) {
        self.state
            .lock()
            .tx_lookup_errors
            .insert(tx_id.to_string(), error);
    }

    pub fn submitted(&self) -> Vec<UpdateRequest> {
        self.state.lock().submitted.clone()
    }

    pub fn published(&self) -> Vec<String> {
        self.state.lock().published.clone()
    }

    pub fn name_lookups(&self) -> usize {
        self.name_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_name_info(&self, fq_name: &str) -> Result<Option<NameInfo>, ChainError> {
        self.name_lookups.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        if let Some(err) = &state.name_lookup_error {
            return Err(err.clone());
        }
        Ok(state.names.get(fq_name).cloned())
    }

    async fn get_chain_info(&self) -> Result<ChainInfo, ChainError> {
        self.state
            .lock()
            .chain_info
            .ok_or_else(|| ChainError::Transport {
                reason: "chain info unavailable".to_string(),
            })
    }

    async fn get_tx_inclusion_height(&self, tx_id: &str) -> Result<Option<u64>, ChainError> {
        let state = self.state.lock();
        if let Some(err) = state
            .tx_lookup_error
            .as_ref()
            .or_else(|| state.tx_lookup_errors.get(tx_id))
        {
            return Err(err.clone());
        }
        Ok(state.tx_heights.get(tx_id).copied())
    }

    async fn submit_update_transaction(
        &self,
        request: &UpdateRequest,
    ) -> Result<TxId, ChainError> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.rejection {
            return Err(ChainError::Rejected {
                reason: reason.clone(),
            });
        }
        state.submitted.push(request.clone());
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("tx-{}", n))
    }

    async fn publish_zonefile(&self, zonefile: &str) -> Result<(), ChainError> {
        let mut state = self.state.lock();
        if state.failing_publishes.contains(zonefile) {
            return Err(ChainError::Transport {
                reason: "publish refused".to_string(),
            });
        }
        state.published.push(zonefile.to_string());
        Ok(())
    }
}

/// Profile resolver reporting a fixed number of valid proofs.
pub struct MockProfileResolver {
    valid_proofs: usize,
    fail: bool,
}

impl MockProfileResolver {
    pub fn with_valid_proofs(valid_proofs: usize) -> Self {
        Self {
            valid_proofs,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            valid_proofs: 0,
            fail: true,
        }
    }
}

#[async_trait]
impl ProfileResolver for MockProfileResolver {
    async fn resolve_profile(&self, _zonefile: &str, owner: &str) -> Result<Profile, ChainError> {
        if self.fail {
            return Err(ChainError::Malformed {
                reason: "no token file url in zone file".to_string(),
            });
        }
        Ok(serde_json::json!({ "owner": owner }))
    }

    async fn validate_proofs(
        &self,
        _profile: &Profile,
        _owner: &str,
    ) -> Result<Vec<ProofCheck>, ChainError> {
        Ok((0..self.valid_proofs + 1)
            .map(|i| ProofCheck {
                service: "twitter".to_string(),
                identifier: format!("user{}", i),
                valid: i < self.valid_proofs,
            })
            .collect())
    }
}

/// Mock time source for testing.
pub struct MockTimeSource {
    time: AtomicU64,
}

impl MockTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}
