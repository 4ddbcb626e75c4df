//! Blake2b-256 hashing.
//!
//! Every digest in the system is `Blake2b` truncated at construction to a
//! 32-byte output (not a truncation of Blake2b-512): chunk value hashes, trie
//! node hashes, the empty-trie root and file keys.

use ::blake2::digest::consts::U32;
use ::blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// `blake2_256(b"")`, used to self-check the hash backend.
pub const EMPTY_INPUT_HASH: [u8; 32] = [
    0x0e, 0x57, 0x51, 0xc0, 0x26, 0xe5, 0x43, 0xb2, 0xe8, 0xab, 0x2e, 0xb0, 0x60, 0x99, 0xda, 0xa1,
    0xd1, 0xe5, 0xdf, 0x47, 0x77, 0x8f, 0x77, 0x87, 0xfa, 0xab, 0x45, 0xcd, 0xf1, 0x2f, 0xe3, 0xa8,
];

/// Compute the Blake2b-256 digest of `data`.
pub fn hash(data: &[u8]) -> [u8; 32] {
    let digest = Blake2b256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_vector() {
        assert_eq!(hash(b""), EMPTY_INPUT_HASH);
    }

    #[test]
    fn test_hash_deterministic() {
        let result1 = hash(b"filetrie test vector 1");
        let result2 = hash(b"filetrie test vector 1");
        assert_eq!(result1, result2);
    }

    #[test]
    fn test_hash_different_inputs() {
        assert_ne!(hash(b"input1"), hash(b"input2"));
    }

    #[test]
    fn test_empty_trie_node_hash() {
        // The single-byte empty node encoding hashes to the well-known
        // empty-trie root of the reference runtime.
        assert_eq!(
            hex::encode(hash(&[0x00])),
            "03170a2e7597b7b7e3d84c05391d139a62b157e78786d8c082f29dcf4c111314"
        );
    }
}
