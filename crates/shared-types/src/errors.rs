//! # Error Types
//!
//! | Error | Retry? |
//! |-------|--------|
//! | `AlreadyQueued` | No, duplicate |
//! | `InvalidOperation` | No |
//! | `SpamRejected` | No |
//! | `LockTimeout` | Yes |
//! | `Chain` | Yes, unless `Rejected` |
//! | `Store` | Yes |

use thiserror::Error;

/// Why an operation failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("sequence number {0} is not a new registration")]
    SequenceNumber(u64),

    #[error("owner is not a valid chain address")]
    OwnerAddress,

    #[error("name contains characters outside [a-z0-9-_+] or is longer than 37")]
    NameSyntax,

    /// Name shorter than the configured minimum. Mapped to its own response.
    #[error("name must be at least {min} characters")]
    NameLength { min: usize },

    #[error("name is already registered on chain")]
    AlreadyRegistered,

    /// The registration lookup failed; treated as not valid.
    #[error("could not confirm name availability: {reason}")]
    ChainUnavailable { reason: String },

    #[error("zone file is too large to fit in an update")]
    ZonefileTooLarge,
}

/// Anti-abuse policy rejection. Messages are user facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpamReason {
    #[error("Owner {owner} already has a pending or completed registration")]
    OwnerAlreadyUsed { owner: String },

    #[error("Registrations require an API key")]
    KeyRequired,

    #[error("IP address unknown, cannot apply rate limit")]
    MissingIp,

    #[error("IP {ip} has reached the limit of {limit} registrations")]
    IpLimit { ip: String, limit: u64 },

    #[error("Proofs are required: found {valid} valid, need {required}")]
    InsufficientProofs { valid: usize, required: usize },

    #[error("Proof validation failed: {reason}")]
    ProofResolution { reason: String },
}

/// Failures reported by, or about, the chain collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("chain request failed: {reason}")]
    Transport { reason: String },

    /// The chain refused the transaction. `reason` is the node's response body.
    #[error("{reason}")]
    Rejected { reason: String },

    #[error("Domain name {domain} not owned by address {owner}")]
    NotOwner { domain: String, owner: String },

    #[error("chain source is stale: indexed {indexed}, tip {tip}")]
    StaleSource { indexed: u64, tip: u64 },

    #[error("chain height regressed: last seen {last_seen}, observed {observed}")]
    HeightRegression { last_seen: u64, observed: u64 },

    /// HTTP 429 from the node. Callers stop and resume next cycle.
    #[error("rate limited by {endpoint}")]
    RateLimited { endpoint: String },

    #[error("chain call {operation} timed out")]
    Timeout { operation: String },

    #[error("malformed chain response: {reason}")]
    Malformed { reason: String },
}

/// Persistence failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("record not found: {0}")]
    NotFound(String),
}

/// Registrar core errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrarError {
    #[error("Subdomain {name} is already queued")]
    AlreadyQueued { name: String },

    #[error("Invalid operation for {name}: {reason}")]
    InvalidOperation { name: String, reason: InvalidReason },

    #[error("{0}")]
    SpamRejected(SpamReason),

    #[error("Failed to obtain lock after {waited_ms}ms")]
    LockTimeout { waited_ms: u64 },

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistrarError {
    pub fn invalid(name: impl Into<String>, reason: InvalidReason) -> Self {
        RegistrarError::InvalidOperation {
            name: name.into(),
            reason,
        }
    }

    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        match self {
            RegistrarError::LockTimeout { .. } | RegistrarError::Store(_) => true,
            RegistrarError::Chain(ChainError::Rejected { .. }) => false,
            RegistrarError::Chain(_) => true,
            _ => false,
        }
    }

    pub fn is_name_length(&self) -> bool {
        matches!(
            self,
            RegistrarError::InvalidOperation {
                reason: InvalidReason::NameLength { .. },
                ..
            }
        )
    }
}

impl From<SpamReason> for RegistrarError {
    fn from(reason: SpamReason) -> Self {
        RegistrarError::SpamRejected(reason)
    }
}

/// Result type for registrar operations
pub type RegistrarResult<T> = Result<T, RegistrarError>;
