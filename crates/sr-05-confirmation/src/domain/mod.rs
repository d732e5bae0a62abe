//! Domain Layer - confirmation rules

pub mod report;

pub use report::{is_confirmed, ConfirmationReport, CONFIRMATION_DEPTH};
