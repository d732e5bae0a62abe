//! # Subdomain Registrar Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Zone-file packing, chunking and queue store throughput
//! └── src/
//!     └── integration/  # Cross-crate flows over the in-memory store
//!         ├── harness.rs
//!         ├── lifecycle.rs
//!         └── http_flow.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sr-tests
//! cargo bench -p sr-tests
//! ```

#[cfg(test)]
mod integration;
