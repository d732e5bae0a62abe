//! # sr-03-admission
//!
//! Decides whether an incoming registration may enter the queue.
//!
//! ## Admission Pipeline
//!
//! | Step | Check | Failure |
//! |------|-------|---------|
//! | 1 | Name has no existing record | `AlreadyQueued` |
//! | 2 | Operation is valid (sequence, owner, name, size, chain) | `InvalidOperation` |
//! | 3 | Owner has never registered before | `SpamRejected("Owner ...")` |
//! | 4 | API key presented | skips steps 5-7 |
//! | 5 | Keyless registrations allowed | `SpamRejected("Registrations require ...")` |
//! | 6 | Per-IP limit (unless whitelisted) | `SpamRejected("IP ...")` |
//! | 7 | Social proofs | `SpamRejected("Proof...")` |
//! | 8 | Under the queue lock: re-check step 1, enqueue, log submitter | `AlreadyQueued`, `LockTimeout` |
//!
//! ## Module Structure
//!
//! ```text
//! ports/inbound.rs     - AdmissionApi, AdmissionRequest
//! domain/address.rs    - c32check owner address validation
//! domain/validation.rs - ValidationRules, RegistrationValidator
//! domain/policy.rs     - SpamPolicy, constant_time_compare
//! service.rs           - AdmissionService
//! ```
//!
//! The validator is shared with the batch engine, which re-runs it on every
//! queued record before building a zone file.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    constant_time_compare, is_valid_address, is_valid_name, RegistrationValidator, SpamPolicy,
    ValidationRules, MAX_NAME_LENGTH,
};
pub use ports::inbound::{AdmissionApi, AdmissionRequest};
pub use service::{AdmissionConfig, AdmissionService};
