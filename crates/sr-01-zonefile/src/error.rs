//! Error types for the zone-file codec

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZonefileError {
    /// Headers and URI records alone reach the ceiling.
    #[error("zone file headers need {size} bytes, limit is {max_bytes}")]
    HeadersExceedLimit { size: usize, max_bytes: usize },

    #[error("invalid base64 chunk: {0}")]
    InvalidChunk(String),

    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
}

pub type ZonefileResult<T> = Result<T, ZonefileError>;
