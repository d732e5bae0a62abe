//! Driving Ports (API - Inbound)

use crate::domain::ConfirmationReport;
use async_trait::async_trait;
use shared_types::RegistrarResult;

#[async_trait]
pub trait ConfirmationApi: Send + Sync {
    /// Run one confirmation cycle under the queue lock.
    async fn check_zonefiles(&self) -> RegistrarResult<ConfirmationReport>;
}
