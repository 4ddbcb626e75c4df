//! Chunk addressing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Zero-based index of a chunk within its file.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChunkId(u64);

impl ChunkId {
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Trie key of this chunk: 8-byte big-endian index.
    ///
    /// Fixed width and order preserving, so the trie shape depends only on
    /// the set of indices.
    pub const fn as_trie_key(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// The following index, or `None` past `u64::MAX`.
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) => Some(Self(next)),
            None => None,
        }
    }
}

impl From<u64> for ChunkId {
    fn from(index: u64) -> Self {
        Self(index)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single chunk of file content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub id: ChunkId,
    /// Raw bytes, at most [`CHUNK_SIZE`](crate::CHUNK_SIZE).
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn new(id: ChunkId, data: Vec<u8>) -> Self {
        Self { id, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
