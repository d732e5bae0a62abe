//! # sr-05-confirmation
//!
//! Follows submitted batch transactions until they are buried under
//! [`CONFIRMATION_DEPTH`] blocks, then republishes their zone files to the
//! naming network and stops tracking them.
//!
//! ```text
//! [tracked, no height] ──included──→ [tracked, height h]
//!                                          │
//!                          h + 7 <= tip ───┴──→ publish ×N ──ok──→ [removed]
//!                                                   │
//!                                                   └── error ──→ [tracked, retry]
//! ```
//!
//! Per-transaction publish failures are isolated; lookup failures and chain
//! cursor violations (regression, stale source) abort the whole cycle.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{is_confirmed, ConfirmationReport, CONFIRMATION_DEPTH};
pub use ports::inbound::ConfirmationApi;
pub use service::{ConfirmationConfig, ConfirmationTracker};
