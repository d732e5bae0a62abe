//! Greedy batch packing under a byte ceiling.

use super::record::to_record;
use super::render::{txt_line, ZoneFile};
use crate::error::{ZonefileError, ZonefileResult};
use shared_types::{SubdomainOperation, UriEntry};
use tracing::debug;

/// Result of packing a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltZonefile {
    /// The last render that fit under the ceiling.
    pub zonefile: String,
    /// Names included, in input order.
    pub included_names: Vec<String>,
}

impl BuiltZonefile {
    pub fn is_empty(&self) -> bool {
        self.included_names.is_empty()
    }
}

/// Append operations in order until the rendered size would reach `max_bytes`.
///
/// Since rendering is concatenation, each candidate's size is the running
/// total plus its TXT line; only the accepted zone file is rendered in full.
/// Packing stops at the first operation that does not fit.
pub fn build_zonefile(
    domain_name: &str,
    uri_entries: &[UriEntry],
    operations: &[SubdomainOperation],
    max_bytes: usize,
) -> ZonefileResult<BuiltZonefile> {
    let mut zonefile = ZoneFile::new(domain_name, uri_entries.to_vec());
    let mut size = zonefile.fixed_len();
    if size >= max_bytes {
        return Err(ZonefileError::HeadersExceedLimit { size, max_bytes });
    }

    let mut included_names = Vec::new();
    for op in operations {
        let record = to_record(op);
        let candidate = size + txt_line(&record).len();
        if candidate >= max_bytes {
            debug!(
                name = %op.subdomain_name,
                size = candidate,
                max_bytes,
                "Zone file full"
            );
            break;
        }
        size = candidate;
        included_names.push(record.name.clone());
        zonefile.txt.push(record);
    }

    Ok(BuiltZonefile {
        zonefile: zonefile.render(),
        included_names,
    })
}

/// Whether `op` fits in a zone file on its own.
pub fn fits_alone(
    domain_name: &str,
    uri_entries: &[UriEntry],
    op: &SubdomainOperation,
    max_bytes: usize,
) -> bool {
    build_zonefile(domain_name, uri_entries, std::slice::from_ref(op), max_bytes)
        .map(|built| !built.is_empty())
        .unwrap_or(false)
}
