//! Driving Ports (API - Inbound)

use crate::domain::{SubdomainInfo, SubdomainStatus};
use async_trait::async_trait;
use shared_types::{QueueIndex, QueueRecord, RegistrarResult};

/// Read-only queries. None of these take the queue lock.
#[async_trait]
pub trait StatusApi: Send + Sync {
    /// Status of `subdomain_name` (the label, without the parent domain).
    async fn status(&self, subdomain_name: &str) -> RegistrarResult<SubdomainStatus>;

    /// One page of recent records with `queue_index >= from_index`.
    async fn list(&self, from_index: QueueIndex) -> RegistrarResult<Vec<QueueRecord>>;

    /// Lookup by fully-qualified name. `None` when no submitted record exists.
    async fn subdomain_info(&self, fq_name: &str) -> RegistrarResult<Option<SubdomainInfo>>;
}
