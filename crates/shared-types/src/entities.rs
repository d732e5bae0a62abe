//! # Core Domain Entities
//!
//! Queue records, submitter log entries and tracked transactions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Position of a record in the queue. Assigned by the store, never reused.
pub type QueueIndex = u64;

/// On-chain transaction identifier.
pub type TxId = String;

/// Only new registrations are accepted.
pub const NEW_REGISTRATION_SEQUENCE: u64 = 0;

/// A requested subdomain registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdomainOperation {
    /// Label under the parent domain, e.g. `alice` for `alice.id.stx`.
    pub subdomain_name: String,
    /// Chain address that will own the subdomain.
    pub owner: String,
    pub sequence_number: u64,
    /// Registrant-supplied zone file, stored verbatim.
    pub zonefile: String,
    /// Carried through to the zone file, never verified.
    pub signature: Option<String>,
}

impl SubdomainOperation {
    /// Build a new-registration operation (sequence number zero, unsigned).
    pub fn new_registration(
        subdomain_name: impl Into<String>,
        owner: impl Into<String>,
        zonefile: impl Into<String>,
    ) -> Self {
        Self {
            subdomain_name: subdomain_name.into(),
            owner: owner.into(),
            sequence_number: NEW_REGISTRATION_SEQUENCE,
            zonefile: zonefile.into(),
            signature: None,
        }
    }

    /// `name.domain`
    pub fn fully_qualified(&self, domain_name: &str) -> String {
        format!("{}.{}", self.subdomain_name, domain_name)
    }
}

/// Lifecycle state of a queue record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueStatus {
    /// Admitted, waiting for a batch.
    Received,
    /// Included in a batch that was broadcast as `tx_id`.
    Submitted { tx_id: TxId },
    /// A post-admission step failed. The name stays reserved.
    Error { detail: String },
}

impl QueueStatus {
    pub fn is_received(&self) -> bool {
        matches!(self, QueueStatus::Received)
    }

    /// Transaction id for submitted records.
    pub fn tx_id(&self) -> Option<&str> {
        match self {
            QueueStatus::Submitted { tx_id } => Some(tx_id),
            _ => None,
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueStatus::Received => write!(f, "received"),
            QueueStatus::Submitted { .. } => write!(f, "submitted"),
            QueueStatus::Error { detail } => write!(f, "error: {}", detail),
        }
    }
}

/// A persisted registration attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRecord {
    pub queue_index: QueueIndex,
    pub operation: SubdomainOperation,
    pub status: QueueStatus,
    pub received_at: Timestamp,
}

impl QueueRecord {
    pub fn name(&self) -> &str {
        &self.operation.subdomain_name
    }
}

/// Who submitted a queued request. Used only for rate-limiting counts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitterRecord {
    pub ip_address: Option<String>,
    pub owner: String,
    pub queue_index: QueueIndex,
}

/// A broadcast batch awaiting confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTransaction {
    pub tx_id: TxId,
    /// Zone file carried by the transaction, republished on confirmation.
    pub zonefile: String,
    /// `None` until the transaction is first seen in a block.
    pub block_height: Option<u64>,
}

impl TrackedTransaction {
    pub fn new(tx_id: impl Into<TxId>, zonefile: impl Into<String>) -> Self {
        Self {
            tx_id: tx_id.into(),
            zonefile: zonefile.into(),
            block_height: None,
        }
    }
}

/// Informational URI record published alongside the subdomain records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriEntry {
    pub name: String,
    pub target: String,
    pub priority: u16,
    pub weight: u16,
}

impl UriEntry {
    /// The `_http._tcp` pointer a registrar advertises for its own API.
    pub fn http_service(target: impl Into<String>) -> Self {
        Self {
            name: "_http._tcp".to_string(),
            target: target.into(),
            priority: 10,
            weight: 1,
        }
    }
}
