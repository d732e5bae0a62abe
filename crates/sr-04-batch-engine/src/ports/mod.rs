//! Ports for the batch engine

pub mod inbound;
