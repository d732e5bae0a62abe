//! Subdomain TXT record construction.

use super::chunks::destructure;
use shared_types::SubdomainOperation;

/// One subdomain's TXT record set, in field order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubdomainRecord {
    pub name: String,
    pub txt: Vec<String>,
}

/// Build `owner=`, `seqn=`, `parts=`, `zf0=`.., then `sig=` when signed.
pub fn to_record(op: &SubdomainOperation) -> SubdomainRecord {
    let pieces = destructure(&op.zonefile);

    let mut txt = Vec::with_capacity(pieces.len() + 4);
    txt.push(format!("owner={}", op.owner));
    txt.push(format!("seqn={}", op.sequence_number));
    txt.push(format!("parts={}", pieces.len()));
    txt.extend(
        pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| format!("zf{}={}", i, piece)),
    );
    if let Some(sig) = &op.signature {
        txt.push(format!("sig={}", sig));
    }

    SubdomainRecord {
        name: op.subdomain_name.clone(),
        txt,
    }
}
