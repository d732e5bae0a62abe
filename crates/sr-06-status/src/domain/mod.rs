//! Domain Layer - status model and presentation

pub mod status;

pub use status::{SubdomainInfo, SubdomainStatus, SUBMITTED_SUBDOMAIN_STATUS};
