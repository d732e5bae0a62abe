//! Admission Service - gate in front of the queue
//!
//! ```text
//! admit(op, ip, token)
//!   │
//!   ├── unlocked ── duplicate? ─→ AlreadyQueued
//!   │               valid?     ─→ InvalidOperation
//!   │               spam?      ─→ SpamRejected
//!   │
//!   └── locked ──── duplicate? ─→ AlreadyQueued
//!                   enqueue + log submitter
//!                   (log failure marks the record Error and propagates)
//! ```
//!
//! Slow checks (chain lookups, proof resolution) run outside the queue lock.
//! The locked re-check closes the race between concurrent admissions.

use crate::domain::{RegistrationValidator, SpamPolicy, ValidationRules};
use crate::ports::inbound::{AdmissionApi, AdmissionRequest};
use async_trait::async_trait;
use shared_types::{
    bounded, ChainClient, ProfileResolver, QueueIndex, QueueLock, QueueStatus, RegistrarError,
    RegistrarResult, SpamReason, SubdomainOperation, SubmitterRecord, TimeSource,
};
use sr_02_queue_store::QueueStore;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Admission configuration
#[derive(Clone, Debug)]
pub struct AdmissionConfig {
    pub rules: ValidationRules,
    pub policy: SpamPolicy,
}

impl AdmissionConfig {
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            rules: ValidationRules::new(domain_name),
            policy: SpamPolicy::default(),
        }
    }
}

pub struct AdmissionService {
    validator: RegistrationValidator,
    policy: SpamPolicy,
    store: Arc<dyn QueueStore>,
    profiles: Arc<dyn ProfileResolver>,
    lock: Arc<QueueLock>,
    time: Arc<dyn TimeSource>,
}

impl AdmissionService {
    pub fn new(
        config: AdmissionConfig,
        store: Arc<dyn QueueStore>,
        chain: Arc<dyn ChainClient>,
        profiles: Arc<dyn ProfileResolver>,
        lock: Arc<QueueLock>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            validator: RegistrationValidator::new(config.rules, chain),
            policy: config.policy,
            store,
            profiles,
            lock,
            time,
        }
    }

    /// Any existing record reserves the name, including errored ones.
    fn ensure_not_queued(&self, name: &str) -> RegistrarResult<()> {
        if self.store.latest_for_name(name)?.is_some() {
            return Err(RegistrarError::AlreadyQueued {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Spam checks in fixed order; the first failure wins.
    async fn check_spam(
        &self,
        op: &SubdomainOperation,
        ip_address: Option<&str>,
        auth_token: Option<&str>,
    ) -> RegistrarResult<()> {
        if self.store.count_by_owner(&op.owner)? >= 1 {
            return Err(SpamReason::OwnerAlreadyUsed {
                owner: op.owner.clone(),
            }
            .into());
        }

        if auth_token.is_some_and(|token| self.policy.is_api_key(token)) {
            debug!(name = %op.subdomain_name, "API key presented, skipping spam checks");
            return Ok(());
        }

        if self.policy.disable_registrations_without_key {
            return Err(SpamReason::KeyRequired.into());
        }

        if self.policy.ip_limit > 0 {
            let ip = ip_address.ok_or(SpamReason::MissingIp)?;
            if !self.policy.is_whitelisted(ip) && self.store.count_by_ip(ip)? >= self.policy.ip_limit {
                return Err(SpamReason::IpLimit {
                    ip: ip.to_string(),
                    limit: self.policy.ip_limit,
                }
                .into());
            }
        }

        if self.policy.proofs_required > 0 {
            self.check_proofs(op).await?;
        }

        Ok(())
    }

    /// Resolution failures reject the request rather than erroring.
    async fn check_proofs(&self, op: &SubdomainOperation) -> Result<(), SpamReason> {
        let limit = self.validator.rules().chain_call_timeout;
        let proofs = async {
            let profile = bounded(
                "resolve_profile",
                limit,
                self.profiles.resolve_profile(&op.zonefile, &op.owner),
            )
            .await?;
            bounded(
                "validate_proofs",
                limit,
                self.profiles.validate_proofs(&profile, &op.owner),
            )
            .await
        }
        .await
        .map_err(|e| {
            warn!(name = %op.subdomain_name, error = %e, "Proof resolution failed");
            SpamReason::ProofResolution {
                reason: e.to_string(),
            }
        })?;

        let valid = proofs.iter().filter(|p| p.valid).count();
        if valid < self.policy.proofs_required {
            return Err(SpamReason::InsufficientProofs {
                valid,
                required: self.policy.proofs_required,
            });
        }
        Ok(())
    }

    /// Locked phase: re-check, insert, log submitter.
    async fn enqueue_locked(
        &self,
        op: &SubdomainOperation,
        ip_address: Option<String>,
    ) -> RegistrarResult<QueueIndex> {
        let _guard = self.lock.acquire().await?;

        self.ensure_not_queued(&op.subdomain_name)?;
        let queue_index = self.store.enqueue(op, self.time.now())?;

        let submitter = SubmitterRecord {
            ip_address,
            owner: op.owner.clone(),
            queue_index,
        };
        if let Err(e) = self.store.log_submitter(&submitter) {
            error!(
                name = %op.subdomain_name,
                queue_index,
                error = %e,
                "Failed to log submitter, marking record as errored"
            );
            let status = QueueStatus::Error {
                detail: format!("submitter log failed: {}", e),
            };
            if let Err(mark_err) = self.store.set_status(queue_index, &status) {
                error!(queue_index, error = %mark_err, "Failed to mark record as errored");
            }
            return Err(e.into());
        }

        Ok(queue_index)
    }
}

#[async_trait]
impl AdmissionApi for AdmissionService {
    async fn admit(&self, request: AdmissionRequest) -> RegistrarResult<QueueIndex> {
        let AdmissionRequest {
            operation: op,
            ip_address,
            auth_token,
        } = request;
        let name = op.subdomain_name.clone();

        self.ensure_not_queued(&name)?;

        self.validator
            .validate(&op)
            .await
            .map_err(|reason| RegistrarError::invalid(&name, reason))?;

        if let Err(e) = self
            .check_spam(&op, ip_address.as_deref(), auth_token.as_deref())
            .await
        {
            warn!(name = %name, owner = %op.owner, error = %e, "Registration rejected");
            return Err(e);
        }

        let queue_index = self.enqueue_locked(&op, ip_address).await?;
        info!(name = %name, owner = %op.owner, queue_index, "Registration queued");
        Ok(queue_index)
    }
}
