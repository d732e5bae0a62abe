//! # sr-06-status
//!
//! Read side of the registrar.
//!
//! ## Resolution Order
//!
//! | Source | Result |
//! |--------|--------|
//! | Chain reports `registered_subdomain` | `Propagated` |
//! | Latest record `received` | `Queued` |
//! | Latest record `submitted` | `Submitted(tx_id)` |
//! | Latest record `error` | `Failed(detail)` |
//! | No record, or a name outside the name alphabet | `NotFound` |
//!
//! A failed chain lookup is an error; it never falls back to local state.
//!
//! Listing is paged by queue index ([`LIST_PAGE_SIZE`] per page) and limited
//! to records received within [`LIST_WINDOW`].

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{SubdomainInfo, SubdomainStatus, SUBMITTED_SUBDOMAIN_STATUS};
pub use ports::inbound::StatusApi;
pub use service::{StatusConfig, StatusResolver, LIST_PAGE_SIZE, LIST_WINDOW};
