//! # Chain Collaborator Ports
//!
//! Narrow interfaces to the naming blockchain. Implementations are network
//! clients; every call may fail transiently.

use crate::entities::TxId;
use crate::errors::ChainError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Status reported by the naming network for a live subdomain.
pub const REGISTERED_SUBDOMAIN_STATUS: &str = "registered_subdomain";

/// Name lookup result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameInfo {
    /// Owning address.
    pub address: Option<String>,
    pub status: Option<String>,
}

impl NameInfo {
    pub fn is_registered_subdomain(&self) -> bool {
        self.status.as_deref() == Some(REGISTERED_SUBDOMAIN_STATUS)
    }

    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.address.as_deref() == Some(owner)
    }
}

/// Heights reported by the chain-info source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    /// Latest block the source has seen on the network.
    pub tip_height: u64,
    /// Latest block the source has fully indexed.
    pub indexed_height: u64,
}

/// An "update name data" transaction to broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateRequest {
    pub domain_name: String,
    pub zonefile: String,
    pub owner_key: String,
    pub payment_key: String,
}

/// Queries and broadcasts against the naming chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// `Ok(None)` when the name does not exist.
    async fn get_name_info(&self, fq_name: &str) -> Result<Option<NameInfo>, ChainError>;

    async fn get_chain_info(&self) -> Result<ChainInfo, ChainError>;

    /// `Ok(None)` while the transaction is unconfirmed.
    async fn get_tx_inclusion_height(&self, tx_id: &str) -> Result<Option<u64>, ChainError>;

    /// Broadcast an update. A refusal must surface as [`ChainError::Rejected`]
    /// carrying the node's reason verbatim.
    async fn submit_update_transaction(&self, request: &UpdateRequest)
        -> Result<TxId, ChainError>;

    /// Announce a zone file to the naming network. Idempotent.
    async fn publish_zonefile(&self, zonefile: &str) -> Result<(), ChainError>;
}

/// Owner profile as resolved from a zone file.
pub type Profile = serde_json::Value;

/// Outcome of validating one social proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofCheck {
    pub service: String,
    pub identifier: String,
    pub valid: bool,
}

/// Profile and social-proof resolution.
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    async fn resolve_profile(&self, zonefile: &str, owner: &str) -> Result<Profile, ChainError>;

    async fn validate_proofs(
        &self,
        profile: &Profile,
        owner: &str,
    ) -> Result<Vec<ProofCheck>, ChainError>;
}

/// Bound a chain call so it cannot hold the queue lock indefinitely.
pub async fn bounded<T, F>(operation: &str, limit: Duration, call: F) -> Result<T, ChainError>
where
    F: Future<Output = Result<T, ChainError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ChainError::Timeout {
            operation: operation.to_string(),
        }),
    }
}
