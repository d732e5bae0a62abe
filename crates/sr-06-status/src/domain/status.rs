//! Resolved status of a subdomain and its user-facing rendering.

use serde::Serialize;
use shared_types::{QueueStatus, TxId};

/// Status string reported by [`SubdomainInfo`].
pub const SUBMITTED_SUBDOMAIN_STATUS: &str = "submitted_subdomain";

/// Blocks a batch needs before it propagates, as quoted to users.
const PROPAGATION_CONFIRMATIONS: u64 = 6;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubdomainStatus {
    /// Live on chain. Overrides local state.
    Propagated,
    Queued,
    Submitted { tx_id: TxId },
    /// Non-terminal local state passed through as is.
    Failed { detail: String },
    NotFound,
}

impl SubdomainStatus {
    pub fn from_queue_status(status: &QueueStatus) -> Self {
        match status {
            QueueStatus::Received => SubdomainStatus::Queued,
            QueueStatus::Submitted { tx_id } => SubdomainStatus::Submitted {
                tx_id: tx_id.clone(),
            },
            QueueStatus::Error { .. } => SubdomainStatus::Failed {
                detail: status.to_string(),
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            SubdomainStatus::Propagated => "Subdomain propagated".to_string(),
            SubdomainStatus::Queued => {
                "Subdomain is queued for update and should be announced within the next few blocks."
                    .to_string()
            }
            SubdomainStatus::Submitted { tx_id } => format!(
                "Your subdomain was registered in transaction {} -- it should propagate on the network once it has {} confirmations.",
                tx_id, PROPAGATION_CONFIRMATIONS
            ),
            SubdomainStatus::Failed { detail } => detail.clone(),
            SubdomainStatus::NotFound => "Subdomain not registered with this registrar".to_string(),
        }
    }

    /// HTTP status code for the status endpoint.
    pub fn status_code(&self) -> u16 {
        match self {
            SubdomainStatus::NotFound => 404,
            _ => 200,
        }
    }

    pub fn tx_id(&self) -> Option<&str> {
        match self {
            SubdomainStatus::Submitted { tx_id } => Some(tx_id),
            _ => None,
        }
    }
}

/// Name-lookup view of a submitted subdomain that is not yet resolvable on chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubdomainInfo {
    pub status: String,
    pub address: String,
    pub last_txid: TxId,
}

impl SubdomainInfo {
    pub fn submitted(address: impl Into<String>, last_txid: impl Into<TxId>) -> Self {
        Self {
            status: SUBMITTED_SUBDOMAIN_STATUS.to_string(),
            address: address.into(),
            last_txid: last_txid.into(),
        }
    }
}
