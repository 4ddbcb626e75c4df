//! Chunk trie of a single file.
//!
//! Chunks are appended at sequential indices starting from zero. Each chunk
//! is stored under `ChunkId::as_trie_key()`, verbatim when it fits
//! [`MAX_INLINE_VALUE`](crate::codec::MAX_INLINE_VALUE) and as `H(chunk)`
//! otherwise. The trie root is the file's fingerprint.

use filetrie_types::{ChunkId, Fingerprint, Hash, CHUNK_SIZE};
use tracing::trace;

use crate::codec::Value;
use crate::trie::PatriciaTrie;
use crate::{Result, TrieError};

/// Fingerprint of a file with no chunks.
pub fn empty_root() -> Fingerprint {
    Fingerprint::new(crate::codec::empty_trie_root())
}

/// Incremental builder for a file fingerprint.
///
/// The root can be queried at any point, so a partially received file
/// reports the fingerprint of the chunks seen so far.
pub struct FileTrie {
    trie: PatriciaTrie,
    /// `None` once a chunk sits at `u64::MAX`.
    next_id: Option<ChunkId>,
}

impl FileTrie {
    pub fn new() -> Self {
        Self {
            trie: PatriciaTrie::new(std::mem::size_of::<u64>()),
            next_id: Some(ChunkId::default()),
        }
    }

    /// Append a chunk at the next sequential index.
    ///
    /// Chunks over [`CHUNK_SIZE`] are rejected and leave the trie unchanged,
    /// as is any chunk pushed after index `u64::MAX` is taken.
    pub fn push_chunk(&mut self, bytes: &[u8]) -> Result<ChunkId> {
        let id = self.next_id.ok_or(TrieError::ChunkIndexOverflow)?;
        self.insert_chunk(id, bytes)?;
        Ok(id)
    }

    /// Place a chunk at an explicit index.
    ///
    /// The root depends only on the set of `(index, bytes)` pairs, so chunks
    /// arriving out of order produce the same fingerprint. The sequential
    /// counter moves past `id` only if `id` is at or beyond it.
    pub fn insert_chunk(&mut self, id: ChunkId, bytes: &[u8]) -> Result<()> {
        if bytes.len() > CHUNK_SIZE {
            return Err(TrieError::OversizedChunk {
                size: bytes.len(),
                max: CHUNK_SIZE,
            });
        }
        self.trie.insert(&id.as_trie_key(), Value::from_bytes(bytes))?;
        if let Some(next) = self.next_id {
            if id >= next {
                self.next_id = id.checked_next();
            }
        }
        trace!(chunk = %id, len = bytes.len(), "chunk added");
        Ok(())
    }

    /// Current root.
    pub fn get_root(&self) -> Fingerprint {
        Fingerprint::new(self.trie.root())
    }

    /// `H(chunk)` of chunk `id`, whether the leaf stores it inline or hashed.
    pub fn chunk_hash(&self, id: ChunkId) -> Option<Hash> {
        self.trie
            .get(&id.as_trie_key())
            .ok()
            .flatten()
            .map(Value::hash)
    }

    /// Number of distinct chunks inserted.
    pub fn chunk_count(&self) -> u64 {
        self.trie.len() as u64
    }

    /// Index the next [`push_chunk`](Self::push_chunk) will use, `None` once
    /// the index space is exhausted.
    pub fn next_chunk_id(&self) -> Option<ChunkId> {
        self.next_id
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }
}

impl Default for FileTrie {
    fn default() -> Self {
        Self::new()
    }
}
