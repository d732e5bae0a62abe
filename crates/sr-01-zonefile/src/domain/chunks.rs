//! Payload chunking.

use crate::error::{ZonefileError, ZonefileResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Characters per chunk. `zf99=` plus a full chunk stays under 255 bytes.
pub const CHUNK_SIZE: usize = 250;

/// Base64-encode `payload` and split it into [`CHUNK_SIZE`] pieces.
///
/// The last piece may be shorter. An empty payload yields no pieces.
pub fn destructure(payload: &str) -> Vec<String> {
    let encoded = STANDARD.encode(payload.as_bytes());
    // Base64 output is ASCII, so byte chunks are char chunks.
    encoded
        .as_bytes()
        .chunks(CHUNK_SIZE)
        .filter(|piece| !piece.is_empty())
        .map(|piece| String::from_utf8_lossy(piece).into_owned())
        .collect()
}

/// Concatenate pieces back into the base64 string.
pub fn reassemble<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks.iter().map(AsRef::as_ref).collect()
}

/// Reassemble and decode pieces into the original payload.
pub fn decode_chunks<S: AsRef<str>>(chunks: &[S]) -> ZonefileResult<String> {
    let bytes = STANDARD
        .decode(reassemble(chunks))
        .map_err(|e| ZonefileError::InvalidChunk(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| ZonefileError::InvalidUtf8)
}
