//! # filetrie-mpt
//!
//! Merkle-Patricia trie over fixed-width keys, and the file trie that folds a
//! file's chunks into a single fingerprint.
//!
//! Node layout and hashing follow the no-extension Patricia layout used by
//! the reference chain runtime, with values over 32 bytes stored by digest, so a runtime verifying
//! chunk proofs reproduces the same roots byte for byte.
//!
//! ## Modules
//!
//! - [`nibble`] — nibble paths and partial-key packing
//! - [`codec`] — node headers and node encodings
//! - [`trie`] — radix insertion with cached node digests
//! - [`file_trie`] — sequential chunk trie (`push_chunk` / `get_root`)

pub mod codec;
pub mod file_trie;
pub mod nibble;
mod node;
pub mod trie;

pub use codec::Value;
pub use file_trie::{empty_root, FileTrie};
pub use trie::PatriciaTrie;

/// Error types for trie operations.
#[derive(Debug, thiserror::Error)]
pub enum TrieError {
    /// A chunk larger than the network chunk size was pushed.
    #[error("oversized chunk: {size} bytes, max {max}")]
    OversizedChunk { size: usize, max: usize },

    /// A key does not have the trie's fixed width.
    #[error("invalid key length: expected {expected}, got {actual}")]
    KeyLength { expected: usize, actual: usize },

    /// A chunk was appended after the last representable index.
    #[error("chunk index space exhausted")]
    ChunkIndexOverflow,
}

/// Convenience result type for trie operations.
pub type Result<T> = std::result::Result<T, TrieError>;
