//! Network adapters for the collaborator ports.

pub mod chain_http;
pub mod profile_http;

pub use chain_http::HttpChainClient;
pub use profile_http::HttpProfileResolver;
