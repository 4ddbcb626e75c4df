//! # filetrie-storage
//!
//! File fingerprinting and file identity.
//!
//! This crate turns a sized byte stream into a fingerprint (the chunk trie
//! root) and binds that fingerprint to its owner and placement in a file
//! key. Durable chunk storage, proofs and transport live elsewhere and
//! consume the values produced here.
//!
//! ## Modules
//!
//! - [`chunker`] — 1 KiB chunk splitting over async readers.
//! - [`fingerprint`] — stream → chunker → trie pipeline and byte sources.
//! - [`metadata`] — canonical metadata encoding and file key derivation.
//! - [`engine`] — process-wide, lazily initialised engine handle.

pub mod chunker;
pub mod engine;
pub mod fingerprint;
pub mod metadata;

#[cfg(test)]
pub(crate) mod testing;

pub use chunker::{expected_chunks, split_bytes, Chunker};
pub use engine::{engine, Engine};
pub use fingerprint::{
    fingerprint, fingerprint_all, fingerprint_bytes, fingerprint_stream, ByteSource, FileSource,
    FingerprintSession, MemorySource, Progress,
};
pub use metadata::FileMetadata;

use filetrie_mpt::TrieError;

/// Error types for fingerprinting and file identity.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading the byte stream failed.
    #[error("stream read failed: {0}")]
    StreamRead(#[from] std::io::Error),

    /// The stream length differs from the declared file size.
    #[error("size mismatch: declared {declared} bytes, stream yielded {read}")]
    SizeMismatch { declared: u64, read: u64 },

    /// A chunk larger than the network chunk size.
    #[error("oversized chunk: {size} bytes, max {max}")]
    OversizedChunk { size: usize, max: usize },

    /// A metadata field violates its documented bound.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The hash backend misbehaved.
    #[error("hashing error: {0}")]
    Hashing(String),

    /// Chunk index past the end of the file.
    #[error("chunk {index} out of range: file has {count} chunks")]
    ChunkOutOfRange { index: u64, count: u64 },

    /// A fingerprint was requested before the stream was fully consumed.
    #[error("fingerprint incomplete: {read} of {declared} bytes consumed")]
    Incomplete { declared: u64, read: u64 },

    /// A concurrent fingerprint task panicked or was cancelled.
    #[error("fingerprint task failed: {0}")]
    Task(String),
}

impl From<TrieError> for StorageError {
    fn from(err: TrieError) -> Self {
        match err {
            TrieError::OversizedChunk { size, max } => StorageError::OversizedChunk { size, max },
            other => StorageError::Hashing(other.to_string()),
        }
    }
}

/// Convenience result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
