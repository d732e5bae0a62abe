//! Ports for the confirmation tracker

pub mod inbound;
