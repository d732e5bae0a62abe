//! Cross-crate flows: admission through batching, confirmation and status,
//! wired the way the runtime wires them.

pub mod harness;

mod http_flow;
mod lifecycle;
