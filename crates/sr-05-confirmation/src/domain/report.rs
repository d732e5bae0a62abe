//! Confirmation depth and cycle outcome.

use serde::Serialize;
use shared_types::TxId;

/// Blocks required on top of the inclusion block before a batch is final.
pub const CONFIRMATION_DEPTH: u64 = 7;

/// Whether a transaction included at `block_height` is final at `tip`.
pub fn is_confirmed(block_height: u64, tip: u64) -> bool {
    block_height.saturating_add(CONFIRMATION_DEPTH) <= tip
}

/// Outcome of one confirmation cycle, by transaction id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfirmationReport {
    /// No inclusion height known yet.
    pub pending: Vec<TxId>,
    /// Included, but not yet deep enough.
    pub unconfirmed: Vec<TxId>,
    /// Republished and no longer tracked.
    pub finalized: Vec<TxId>,
    /// Deep enough, but republishing failed. Still tracked.
    pub failed: Vec<TxId>,
}

impl ConfirmationReport {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
            && self.unconfirmed.is_empty()
            && self.finalized.is_empty()
            && self.failed.is_empty()
    }
}
