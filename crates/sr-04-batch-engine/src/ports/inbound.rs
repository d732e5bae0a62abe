//! Driving Ports (API - Inbound)

use async_trait::async_trait;
use shared_types::{RegistrarResult, TxId};

/// Primary API for issuing batches. Driven by the scheduler and the admin endpoint.
#[async_trait]
pub trait BatchApi: Send + Sync {
    /// Run one batch cycle under the queue lock.
    ///
    /// Returns `None` when nothing was submitted.
    async fn submit_batch(&self) -> RegistrarResult<Option<TxId>>;
}
