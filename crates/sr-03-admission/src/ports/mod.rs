//! Ports for the admission controller

pub mod inbound;
