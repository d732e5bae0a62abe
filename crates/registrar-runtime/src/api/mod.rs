//! HTTP surface (axum).

pub mod auth;
pub mod handlers;
pub mod router;

pub use router::{build_router, AppState};
