//! Domain Layer - Pure codec logic
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod builder;
pub mod chunks;
pub mod record;
pub mod render;
