//! # Chain Cursor
//!
//! Process-wide last-observed chain height.
//!
//! ## Invariants
//!
//! | Check | Failure |
//! |-------|---------|
//! | `observed >= last_seen` | `HeightRegression` |
//! | `indexed + STALE_BLOCK_TOLERANCE >= tip` | `StaleSource` |
//!
//! The cursor only advances when both checks pass.

use crate::chain::{bounded, ChainClient, ChainInfo};
use crate::errors::ChainError;
use parking_lot::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// How far the indexed height may lag the tip before the source is stale.
pub const STALE_BLOCK_TOLERANCE: u64 = 10;

#[derive(Debug, Default)]
pub struct ChainCursor {
    last_seen: Mutex<u64>,
}

impl ChainCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self) -> u64 {
        *self.last_seen.lock()
    }

    /// Validate freshly fetched heights and advance. Returns the current tip.
    pub fn observe(&self, info: ChainInfo) -> Result<u64, ChainError> {
        let mut last_seen = self.last_seen.lock();

        if info.tip_height < *last_seen {
            warn!(
                last_seen = *last_seen,
                observed = info.tip_height,
                "Chain height regressed"
            );
            return Err(ChainError::HeightRegression {
                last_seen: *last_seen,
                observed: info.tip_height,
            });
        }

        if info.indexed_height + STALE_BLOCK_TOLERANCE < info.tip_height {
            warn!(
                indexed = info.indexed_height,
                tip = info.tip_height,
                "Chain source is stale"
            );
            return Err(ChainError::StaleSource {
                indexed: info.indexed_height,
                tip: info.tip_height,
            });
        }

        *last_seen = info.tip_height;
        debug!(tip = info.tip_height, "Chain cursor advanced");
        Ok(info.tip_height)
    }

    /// Fetch chain info with a bounded call and [`observe`](Self::observe) it.
    pub async fn refresh(&self, chain: &dyn ChainClient, limit: Duration) -> Result<u64, ChainError> {
        let info = bounded("get_chain_info", limit, chain.get_chain_info()).await?;
        self.observe(info)
    }
}
