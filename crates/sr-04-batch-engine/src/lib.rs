//! # sr-04-batch-engine
//!
//! Turns the queue of `received` registrations into on-chain updates: one
//! transaction per cycle, carrying a zone file with as many records as fit.
//!
//! ## Guarantees
//!
//! | Property | Enforcement |
//! |----------|-------------|
//! | One cycle at a time | Whole cycle runs under the queue lock |
//! | No status change without submission | `update_status` runs after the chain returned a tx id |
//! | Rejections are explicit | `ChainError::Rejected` carries the chain's reason verbatim |
//! | Invalid entries are not poisoned | Dropped from the batch, left `received` |
//! | Stale data source aborts | Chain cursor refresh before submitting |
//! | Ownership | Domain must be owned by the configured address |
//!
//! Every submitted zone file is appended to the backup log first.

pub mod ports;
pub mod service;

pub use ports::inbound::BatchApi;
pub use service::{BatchConfig, BatchEngine};
