//! Process-wide engine handle.
//!
//! The engine carries no mutable state. It exists so that the hash backend
//! is checked against known vectors exactly once per process before any
//! fingerprint or file key is handed out.

use filetrie_crypto::blake2;
use filetrie_mpt::codec::{empty_trie_root, EMPTY_TRIE_ROOT};
use filetrie_types::{FileKey, Fingerprint, CHUNK_SIZE};
use tokio::sync::OnceCell;
use tracing::info;

use crate::fingerprint::{fingerprint, ByteSource};
use crate::metadata::FileMetadata;
use crate::{Result, StorageError};

static ENGINE: OnceCell<Engine> = OnceCell::const_new();

/// Shared handle to the fingerprinting engine.
///
/// Concurrent first callers await the same initialisation. A failed
/// self-check is returned to every caller that raced it, and the next call
/// retries.
pub async fn engine() -> Result<&'static Engine> {
    ENGINE.get_or_try_init(|| async { Engine::init() }).await
}

#[derive(Debug)]
pub struct Engine {
    empty_root: Fingerprint,
}

impl Engine {
    fn init() -> Result<Self> {
        if blake2::hash(&[]) != blake2::EMPTY_INPUT_HASH {
            return Err(StorageError::Hashing(
                "blake2b-256 of empty input does not match the known digest".into(),
            ));
        }
        let empty = empty_trie_root();
        if empty != EMPTY_TRIE_ROOT {
            return Err(StorageError::Hashing(
                "empty trie root does not match the known constant".into(),
            ));
        }
        let empty_root = Fingerprint::new(empty);
        info!(empty_root = %empty_root, chunk_size = CHUNK_SIZE, "fingerprint engine ready");
        Ok(Self { empty_root })
    }

    /// Fingerprint of a zero-length file.
    pub fn empty_root(&self) -> Fingerprint {
        self.empty_root
    }

    pub fn chunk_size(&self) -> usize {
        CHUNK_SIZE
    }

    pub async fn fingerprint<S: ByteSource>(&self, source: &S) -> Result<Fingerprint> {
        fingerprint(source).await
    }

    pub fn file_key(&self, metadata: &FileMetadata) -> Result<FileKey> {
        metadata.file_key()
    }
}
