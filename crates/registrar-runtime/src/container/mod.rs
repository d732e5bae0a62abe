//! # Registrar Container
//!
//! Configuration and service wiring.

pub mod config;
pub mod services;

pub use config::{ConfigError, RegistrarConfig};
pub use services::RegistrarContainer;
