//! Registration validity rules.
//!
//! Checked in order, first failure wins:
//!
//! 1. sequence number is zero
//! 2. owner is a valid chain address
//! 3. name matches `^[a-z0-9\-_+]{1,37}$`
//! 4. name meets the configured minimum length
//! 5. the operation fits in a zone file on its own
//! 6. (optional) the fully-qualified name is not a live subdomain on chain

use super::address::is_valid_address;
use shared_types::{
    bounded, ChainClient, InvalidReason, SubdomainOperation, UriEntry, NEW_REGISTRATION_SEQUENCE,
};
use sr_01_zonefile::fits_alone;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const MAX_NAME_LENGTH: usize = 37;

/// Characters allowed in a subdomain label.
pub fn is_valid_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '+')
}

pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_NAME_LENGTH && name.chars().all(is_valid_name_char)
}

#[derive(Clone, Debug)]
pub struct ValidationRules {
    pub domain_name: String,
    pub name_min_length: Option<usize>,
    pub zonefile_max_bytes: usize,
    pub uri_entries: Vec<UriEntry>,
    /// Ask the chain whether the name is already registered.
    pub check_chain: bool,
    pub chain_call_timeout: Duration,
}

impl ValidationRules {
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            name_min_length: None,
            zonefile_max_bytes: 4096,
            uri_entries: Vec::new(),
            check_chain: false,
            chain_call_timeout: Duration::from_secs(10),
        }
    }

    /// Local checks only, no I/O.
    pub fn check_syntax(&self, op: &SubdomainOperation) -> Result<(), InvalidReason> {
        if op.sequence_number != NEW_REGISTRATION_SEQUENCE {
            return Err(InvalidReason::SequenceNumber(op.sequence_number));
        }
        if !is_valid_address(&op.owner) {
            return Err(InvalidReason::OwnerAddress);
        }
        if !is_valid_name(&op.subdomain_name) {
            return Err(InvalidReason::NameSyntax);
        }
        if let Some(min) = self.name_min_length {
            if op.subdomain_name.len() < min {
                return Err(InvalidReason::NameLength { min });
            }
        }
        if !fits_alone(
            &self.domain_name,
            &self.uri_entries,
            op,
            self.zonefile_max_bytes,
        ) {
            return Err(InvalidReason::ZonefileTooLarge);
        }
        Ok(())
    }
}

/// Validates operations at admission and again at batch time.
pub struct RegistrationValidator {
    rules: ValidationRules,
    chain: Arc<dyn ChainClient>,
}

impl RegistrationValidator {
    pub fn new(rules: ValidationRules, chain: Arc<dyn ChainClient>) -> Self {
        Self { rules, chain }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub async fn validate(&self, op: &SubdomainOperation) -> Result<(), InvalidReason> {
        self.rules.check_syntax(op)?;
        if self.rules.check_chain {
            self.check_not_registered(op).await?;
        }
        Ok(())
    }

    async fn check_not_registered(&self, op: &SubdomainOperation) -> Result<(), InvalidReason> {
        let fq_name = op.fully_qualified(&self.rules.domain_name);
        let lookup = bounded(
            "get_name_info",
            self.rules.chain_call_timeout,
            self.chain.get_name_info(&fq_name),
        )
        .await;

        match lookup {
            Ok(Some(info)) if info.is_registered_subdomain() => {
                debug!(name = %fq_name, "Name already on chain");
                Err(InvalidReason::AlreadyRegistered)
            }
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(name = %fq_name, error = %e, "Name lookup failed, treating as invalid");
                Err(InvalidReason::ChainUnavailable {
                    reason: e.to_string(),
                })
            }
        }
    }
}
