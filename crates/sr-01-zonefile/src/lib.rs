//! # sr-01-zonefile
//!
//! Zone-file codec for batched subdomain updates.
//!
//! ## Overview
//!
//! - **Chunking**: a registrant's zone file is base64-encoded and split into
//!   250-character pieces so `zfNN=<piece>` stays under the 255-byte TXT
//!   string limit.
//! - **Records**: each subdomain becomes one TXT record set
//!   (`owner=`, `seqn=`, `parts=`, `zf0=`..., optional `sig=`).
//! - **Packing**: operations are appended greedily in queue order until the
//!   rendered zone file would reach the byte ceiling.
//!
//! ## Rendered Format
//!
//! ```text
//! $ORIGIN id.stx
//! $TTL 3600
//! alice\tIN\tTXT\t"owner=SP..." "seqn=0" "parts=1" "zf0=aGVsbG8="
//! _http._tcp\tIN\tURI\t10\t1\t"https://registrar.example"
//! ```
//!
//! ## Invariants
//!
//! | Property | Guarantee |
//! |----------|-----------|
//! | Size | A built zone file is always `< max_bytes` |
//! | Order | Included names are a prefix of the input order |
//! | Chunks | Concatenated chunks equal `base64(payload)` |

pub mod domain;
pub mod error;

pub use domain::builder::{build_zonefile, fits_alone, BuiltZonefile};
pub use domain::chunks::{decode_chunks, destructure, reassemble, CHUNK_SIZE};
pub use domain::record::{to_record, SubdomainRecord};
pub use domain::render::{ZoneFile, DEFAULT_TTL};
pub use error::{ZonefileError, ZonefileResult};
