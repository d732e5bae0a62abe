//! A registrar wired over mocks.

use registrar_runtime::container::{RegistrarConfig, RegistrarContainer};
use shared_types::testing::{
    MockChainClient, MockProfileResolver, MockTimeSource, REGISTRAR_ADDRESS,
};
use shared_types::{QueueIndex, RegistrarResult, SubdomainOperation};
use sr_02_queue_store::InMemoryQueueStore;
use sr_03_admission::{AdmissionApi, AdmissionRequest};
use sr_04_batch_engine::BatchApi;
use std::sync::Arc;

pub const DOMAIN: &str = "foo.id";
pub const START_TIME_MS: u64 = 1_700_000_000_000;

pub struct Registrar {
    pub container: RegistrarContainer,
    pub chain: Arc<MockChainClient>,
    pub store: Arc<InMemoryQueueStore>,
}

/// Config for `foo.id` owned by [`REGISTRAR_ADDRESS`].
pub fn base_config() -> RegistrarConfig {
    RegistrarConfig {
        domain_name: DOMAIN.into(),
        owner_address: REGISTRAR_ADDRESS.into(),
        owner_key: "owner-key".into(),
        payment_key: "payment-key".into(),
        ..Default::default()
    }
}

impl Registrar {
    pub fn new() -> Self {
        Self::with_config(base_config())
    }

    /// Chain at height 100, fully indexed, domain owned by the registrar.
    pub fn with_config(config: RegistrarConfig) -> Self {
        let chain = Arc::new(
            MockChainClient::new()
                .with_domain_owner(DOMAIN, REGISTRAR_ADDRESS)
                .with_chain_info(100, 100),
        );
        let store = Arc::new(InMemoryQueueStore::new());
        let container = RegistrarContainer::with_collaborators(
            config,
            store.clone(),
            chain.clone(),
            Arc::new(MockProfileResolver::with_valid_proofs(0)),
            Arc::new(MockTimeSource::new(START_TIME_MS)),
        );
        Self {
            container,
            chain,
            store,
        }
    }

    pub async fn register(&self, name: &str, owner: &str) -> RegistrarResult<QueueIndex> {
        let op = SubdomainOperation::new_registration(name, owner, format!("zonefile for {}", name));
        self.container
            .admission
            .admit(AdmissionRequest::new(op).from_ip("10.0.0.1"))
            .await
    }

    /// Submit batches until the queue is drained.
    pub async fn drain(&self) -> Vec<String> {
        let mut tx_ids = Vec::new();
        while let Some(tx_id) = self.container.batch.submit_batch().await.unwrap() {
            tx_ids.push(tx_id);
        }
        tx_ids
    }

    /// Advance the chain tip, fully indexed.
    pub fn set_height(&self, height: u64) {
        self.chain.set_chain_info(height, height);
    }
}

impl Default for Registrar {
    fn default() -> Self {
        Self::new()
    }
}

/// Times `name` appears as a TXT owner line across `zonefiles`.
pub fn occurrences(zonefiles: &[String], name: &str) -> usize {
    let needle = format!("\n{}\tIN\tTXT\t", name);
    zonefiles.iter().map(|zf| zf.matches(&needle).count()).sum()
}
