//! Ports for the status resolver

pub mod inbound;
