//! Anti-abuse policy settings.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpamPolicy {
    /// Prior registrations allowed per IP. Zero disables the limit.
    pub ip_limit: u64,
    /// IPs exempt from `ip_limit`.
    pub ip_whitelist: Vec<String>,
    /// Bearer tokens that bypass every check after the owner check.
    pub api_keys: Vec<String>,
    pub disable_registrations_without_key: bool,
    /// Valid social proofs required. Zero disables proof checking.
    pub proofs_required: usize,
}

impl SpamPolicy {
    /// Constant-time match of `token` against the configured keys.
    pub fn is_api_key(&self, token: &str) -> bool {
        self.api_keys
            .iter()
            .fold(false, |found, key| found | constant_time_compare(token, key))
    }

    pub fn is_whitelisted(&self, ip: &str) -> bool {
        self.ip_whitelist.iter().any(|allowed| allowed == ip)
    }
}

/// Constant-time string comparison.
///
/// Both inputs are padded to the longer length with different fill bytes,
/// so a length mismatch never compares equal.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);
    (lengths_equal & contents_equal).into()
}
