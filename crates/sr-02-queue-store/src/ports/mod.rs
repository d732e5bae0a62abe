//! Ports for the queue store

pub mod store;
