//! # filetrie-types
//!
//! Shared value types used across the filetrie workspace: content
//! fingerprints, file keys, bucket identifiers and chunk addressing.

pub mod chunk;
pub mod ids;

pub use chunk::{Chunk, ChunkId};
pub use ids::{BucketId, FileKey, Fingerprint};

/// Raw 32-byte digest.
pub type Hash = [u8; 32];

/// Width of every digest and identifier, in bytes.
pub const H_LENGTH: usize = 32;

/// Network-wide chunk size in bytes. Not configurable.
pub const CHUNK_SIZE: usize = 1024;

/// Maximum length of a file owner identifier.
pub const MAX_OWNER_LEN: usize = 256;

/// Maximum length of a file location (path inside a bucket).
pub const MAX_LOCATION_LEN: usize = 512;

/// Error parsing a typed identifier.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// The identifier string is not 32 bytes of hex.
    #[error("invalid {kind}: {source}")]
    InvalidId {
        kind: &'static str,
        #[source]
        source: filetrie_crypto::CryptoError,
    },
}

pub type Result<T> = std::result::Result<T, TypesError>;
