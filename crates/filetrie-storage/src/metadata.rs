//! File metadata and file key derivation.
//!
//! A file's identity on the network is the hash of its metadata encoded as:
//!
//! ```text
//! LE32(len(owner))    || owner
//! bucket_id           (32 bytes)
//! LE32(len(location)) || location
//! LE64(file_size)
//! fingerprint         (32 bytes)
//! ```
//!
//! Field order is significant: two files that differ only by which of two
//! equal-length byte strings is the owner and which is the location get
//! different keys.

use filetrie_crypto::blake2;
use filetrie_crypto::encoding::put_length_prefixed;
use filetrie_types::{
    BucketId, ChunkId, FileKey, Fingerprint, CHUNK_SIZE, H_LENGTH, MAX_LOCATION_LEN,
    MAX_OWNER_LEN,
};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

use crate::chunker::expected_chunks;
use crate::{Result, StorageError};

/// Everything that identifies a stored file.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Account that owns the file, as raw bytes.
    #[serde_as(as = "Hex")]
    pub owner: Vec<u8>,
    pub bucket_id: BucketId,
    /// Path of the file within its bucket.
    #[serde_as(as = "Hex")]
    pub location: Vec<u8>,
    pub file_size: u64,
    pub fingerprint: Fingerprint,
}

impl FileMetadata {
    pub fn new(
        owner: impl Into<Vec<u8>>,
        bucket_id: BucketId,
        location: impl Into<Vec<u8>>,
        file_size: u64,
        fingerprint: Fingerprint,
    ) -> Self {
        Self {
            owner: owner.into(),
            bucket_id,
            location: location.into(),
            file_size,
            fingerprint,
        }
    }

    /// Canonical byte encoding. Fails with [`StorageError::Encoding`] if
    /// `owner` or `location` exceeds its bound.
    pub fn encode(&self) -> Result<Vec<u8>> {
        check_bound("owner", &self.owner, MAX_OWNER_LEN)?;
        check_bound("location", &self.location, MAX_LOCATION_LEN)?;

        let mut out =
            Vec::with_capacity(4 + self.owner.len() + 4 + self.location.len() + 8 + 2 * H_LENGTH);
        put_length_prefixed(&mut out, &self.owner)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        out.extend_from_slice(self.bucket_id.as_bytes());
        put_length_prefixed(&mut out, &self.location)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        out.extend_from_slice(&self.file_size.to_le_bytes());
        out.extend_from_slice(self.fingerprint.as_bytes());
        Ok(out)
    }

    /// `H(encode())`.
    pub fn file_key(&self) -> Result<FileKey> {
        Ok(FileKey::new(blake2::hash(&self.encode()?)))
    }

    /// Number of chunks the file splits into.
    pub fn chunks_count(&self) -> u64 {
        expected_chunks(self.file_size)
    }

    /// Index of the final chunk, `None` for an empty file.
    pub fn last_chunk_id(&self) -> Option<ChunkId> {
        self.chunks_count().checked_sub(1).map(ChunkId::new)
    }

    pub fn is_last_chunk(&self, id: ChunkId) -> bool {
        self.last_chunk_id() == Some(id)
    }

    /// Length of chunk `id` in bytes.
    pub fn chunk_size_at(&self, id: ChunkId) -> Result<usize> {
        let count = self.chunks_count();
        if id.as_u64() >= count {
            return Err(StorageError::ChunkOutOfRange {
                index: id.as_u64(),
                count,
            });
        }
        let tail = (self.file_size % CHUNK_SIZE as u64) as usize;
        if self.is_last_chunk(id) && tail != 0 {
            Ok(tail)
        } else {
            Ok(CHUNK_SIZE)
        }
    }
}

fn check_bound(field: &str, value: &[u8], max: usize) -> Result<()> {
    if value.len() > max {
        return Err(StorageError::Encoding(format!(
            "{field} is {} bytes, max {max}",
            value.len()
        )));
    }
    Ok(())
}
