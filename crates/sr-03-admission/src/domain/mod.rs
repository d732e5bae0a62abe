//! Domain Layer - validation and policy rules

pub mod address;
pub mod policy;
pub mod validation;

pub use address::is_valid_address;
pub use policy::{constant_time_compare, SpamPolicy};
pub use validation::{is_valid_name, RegistrationValidator, ValidationRules, MAX_NAME_LENGTH};
