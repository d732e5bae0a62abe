//! Stacks c32check address validation.
//!
//! `S` + version character + c32(hash160 ‖ checksum), where the checksum is
//! the first four bytes of `sha256(sha256(version ‖ hash160))`.

use sha2::{Digest, Sha256};

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Mainnet single-sig (`P`), mainnet multi-sig (`M`),
/// testnet single-sig (`T`), testnet multi-sig (`N`).
pub const ADDRESS_VERSIONS: [u8; 4] = [22, 20, 26, 21];

const HASH160_LEN: usize = 20;
const CHECKSUM_LEN: usize = 4;

fn c32_value(c: u8) -> Option<u8> {
    let normalized = match c.to_ascii_uppercase() {
        b'O' => b'0',
        b'I' | b'L' => b'1',
        other => other,
    };
    C32_ALPHABET
        .iter()
        .position(|&a| a == normalized)
        .map(|p| p as u8)
}

/// Decode c32 text into bytes, keeping one zero byte per leading `0`.
fn c32_decode(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8 + 1);
    let mut carry: u16 = 0;
    let mut carry_bits = 0;

    for c in input.bytes().rev() {
        carry |= u16::from(c32_value(c)?) << carry_bits;
        carry_bits += 5;
        if carry_bits >= 8 {
            out.push((carry & 0xff) as u8);
            carry >>= 8;
            carry_bits -= 8;
        }
    }
    if carry_bits > 0 {
        out.push(carry as u8);
    }

    while out.last() == Some(&0) {
        out.pop();
    }
    let leading_zeros = input.bytes().take_while(|&c| c == b'0').count();
    out.extend(std::iter::repeat(0).take(leading_zeros));
    out.reverse();
    Some(out)
}

/// Whether `address` is a well-formed Stacks address with a valid checksum.
pub fn is_valid_address(address: &str) -> bool {
    let bytes = address.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'S' {
        return false;
    }
    let Some(version) = c32_value(bytes[1]) else {
        return false;
    };
    if !ADDRESS_VERSIONS.contains(&version) {
        return false;
    }
    let Some(data) = c32_decode(&address[2..]) else {
        return false;
    };
    if data.len() != HASH160_LEN + CHECKSUM_LEN {
        return false;
    }

    let (hash160, checksum) = data.split_at(HASH160_LEN);
    let mut preimage = Vec::with_capacity(1 + HASH160_LEN);
    preimage.push(version);
    preimage.extend_from_slice(hash160);
    let digest = Sha256::digest(Sha256::digest(&preimage));
    &digest[..CHECKSUM_LEN] == checksum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_addresses() {
        assert!(is_valid_address("SP000000000000000000002Q6VF78"));
        assert!(is_valid_address("ST000000000000000000002AMW42H"));
        assert!(is_valid_address("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7"));
        assert!(is_valid_address("ST2NTQAXBNENTQAXBNENTQAXBNENTQAXBNE3WRTBB"));
    }

    #[test]
    fn test_bad_checksum() {
        assert!(!is_valid_address("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ8"));
    }

    #[test]
    fn test_malformed() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("SP"));
        assert!(!is_valid_address("XP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7"));
        // 'U' is not in the c32 alphabet
        assert!(!is_valid_address("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJU"));
        // Version 'A' is not an address version
        assert!(!is_valid_address("SA2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7"));
        assert!(!is_valid_address("SP2J6ZY48GV1"));
        // Bitcoin-style address
        assert!(!is_valid_address("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_valid_address("SP2j6zy48gv1ez5v2v5rb9mp66sw86pykknrv9ej7"));
    }
}
