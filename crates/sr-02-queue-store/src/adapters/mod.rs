//! Queue store adapters

pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(test)]
pub(crate) mod conformance;
