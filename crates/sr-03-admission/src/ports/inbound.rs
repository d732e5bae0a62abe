//! Driving Ports (API - Inbound)

use async_trait::async_trait;
use shared_types::{QueueIndex, RegistrarResult, SubdomainOperation};

/// A registration as received from the outside.
#[derive(Clone, Debug)]
pub struct AdmissionRequest {
    pub operation: SubdomainOperation,
    /// Submitter address, when known.
    pub ip_address: Option<String>,
    /// Bearer token, matched against the configured API keys.
    pub auth_token: Option<String>,
}

impl AdmissionRequest {
    pub fn new(operation: SubdomainOperation) -> Self {
        Self {
            operation,
            ip_address: None,
            auth_token: None,
        }
    }

    pub fn from_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Primary API for admitting registrations.
#[async_trait]
pub trait AdmissionApi: Send + Sync {
    /// Validate, apply policy and enqueue. Returns the assigned queue index.
    async fn admit(&self, request: AdmissionRequest) -> RegistrarResult<QueueIndex>;
}
