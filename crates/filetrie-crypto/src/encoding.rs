//! Byte encodings with a single canonical form.
//!
//! - Compact integers (`compact`) for length prefixes inside trie nodes.
//! - Fixed-width length-prefixed fields for metadata:
//!   `LE32(len(field)) || field`.
//! - `0x`-prefixed lowercase hex for 32-byte identifiers.

use crate::{CryptoError, Result};

/// Append the compact encoding of `value` to `out`.
///
/// Two low bits select the mode: `00` single byte (`< 2^6`), `01` two bytes
/// (`< 2^14`), `10` four bytes (`< 2^30`), `11` big-integer mode where the
/// upper six bits hold the byte count minus four.
pub fn compact_encode_into(out: &mut Vec<u8>, value: u64) {
    if value < 1 << 6 {
        out.push((value as u8) << 2);
    } else if value < 1 << 14 {
        out.extend_from_slice(&(((value as u16) << 2) | 0b01).to_le_bytes());
    } else if value < 1 << 30 {
        out.extend_from_slice(&(((value as u32) << 2) | 0b10).to_le_bytes());
    } else {
        let bytes = value.to_le_bytes();
        let used = (8 - value.leading_zeros() as usize / 8).max(4);
        out.push((((used - 4) as u8) << 2) | 0b11);
        out.extend_from_slice(&bytes[..used]);
    }
}

/// Compact encoding of `value` as a new buffer.
pub fn compact_encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(9);
    compact_encode_into(&mut out, value);
    out
}

/// Append `LE32(len(field)) || field` to `out`.
pub fn put_length_prefixed(out: &mut Vec<u8>, field: &[u8]) -> Result<()> {
    let len = u32::try_from(field.len()).map_err(|_| CryptoError::FieldTooLong(field.len()))?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(field);
    Ok(())
}

/// Render bytes as `0x`-prefixed lowercase hex.
pub fn to_prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse exactly 32 bytes of hex, with or without a `0x` prefix.
pub fn decode_hex32(s: &str) -> Result<[u8; 32]> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let bytes = hex::decode(digits).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })
}
