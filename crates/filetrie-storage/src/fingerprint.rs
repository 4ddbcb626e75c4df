//! Stream → chunker → trie pipeline.
//!
//! [`fingerprint_stream`] is the one-shot entry point: open a stream, chunk
//! it, fold every chunk into a fresh [`FileTrie`] and return the root. Any
//! failure aborts the call and no root is produced.
//!
//! [`FingerprintSession`] exposes the same pipeline step by step for callers
//! that want progress reporting or the root of a partially read file.

use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use filetrie_mpt::FileTrie;
use filetrie_types::{Fingerprint, CHUNK_SIZE};
use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncRead, BufReader};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use crate::chunker::{expected_chunks, Chunker};
use crate::{Result, StorageError};

/// Read buffer used for files on disk.
const FILE_READ_BUFFER: usize = 64 * 1024;

/// A sized, reopenable source of file bytes.
pub trait ByteSource {
    type Reader: AsyncRead + Unpin + Send;

    /// Declared length in bytes.
    fn size(&self) -> u64;

    /// Open a fresh stream positioned at the first byte.
    fn open(&self) -> impl Future<Output = io::Result<Self::Reader>> + Send;
}

/// File on the local filesystem.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
    size: u64,
}

impl FileSource {
    /// Stat `path` and record its current length as the declared size.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let size = tokio::fs::metadata(&path).await?.len();
        Ok(Self { path, size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    type Reader = BufReader<File>;

    fn size(&self) -> u64 {
        self.size
    }

    fn open(&self) -> impl Future<Output = io::Result<Self::Reader>> + Send {
        let path = self.path.clone();
        async move {
            let file = File::open(path).await?;
            Ok(BufReader::with_capacity(FILE_READ_BUFFER, file))
        }
    }
}

/// Shared in-memory buffer.
#[derive(Clone, Debug)]
pub struct MemorySource {
    bytes: Arc<[u8]>,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl ByteSource for MemorySource {
    type Reader = io::Cursor<Arc<[u8]>>;

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn open(&self) -> impl Future<Output = io::Result<Self::Reader>> + Send {
        std::future::ready(Ok(io::Cursor::new(Arc::clone(&self.bytes))))
    }
}

/// Fingerprint a stream of `size` bytes produced by `open_stream`.
pub async fn fingerprint_stream<F, Fut, R>(size: u64, open_stream: F) -> Result<Fingerprint>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = io::Result<R>>,
    R: AsyncRead + Unpin,
{
    let reader = open_stream().await?;
    let mut session = FingerprintSession::new(reader, size);
    session.run().await?;
    session.finish()
}

/// Fingerprint a [`ByteSource`].
pub async fn fingerprint<S: ByteSource>(source: &S) -> Result<Fingerprint> {
    fingerprint_stream(source.size(), move || source.open()).await
}

/// Fingerprint a buffer already in memory.
pub fn fingerprint_bytes(data: &[u8]) -> Result<Fingerprint> {
    let mut trie = FileTrie::new();
    for chunk in data.chunks(CHUNK_SIZE) {
        trie.push_chunk(chunk)?;
    }
    Ok(trie.get_root())
}

/// Fingerprint independent sources concurrently.
///
/// At most `max_concurrent` sources are read at once (at least one). Each
/// source gets its own trie, and results come back in input order.
pub async fn fingerprint_all<S>(sources: Vec<S>, max_concurrent: usize) -> Vec<Result<Fingerprint>>
where
    S: ByteSource + Send + Sync + 'static,
{
    let permits = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let count = sources.len();
    let mut tasks = JoinSet::new();

    for (index, source) in sources.into_iter().enumerate() {
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => fingerprint(&source).await,
                Err(e) => Err(StorageError::Task(e.to_string())),
            };
            (index, result)
        });
    }

    let mut results: Vec<Option<Result<Fingerprint>>> = (0..count).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => warn!(error = %e, "fingerprint task did not complete"),
        }
    }

    results
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| Err(StorageError::Task("task did not complete".into()))))
        .collect()
}

/// How far a [`FingerprintSession`] has got.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub chunks_done: u64,
    pub chunks_expected: u64,
    pub bytes_read: u64,
    pub bytes_expected: u64,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.chunks_done == self.chunks_expected
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} chunks", self.chunks_done, self.chunks_expected)
    }
}

/// Caller-driven fingerprinting of one stream.
pub struct FingerprintSession<R> {
    chunker: Chunker<R>,
    trie: FileTrie,
}

impl<R: AsyncRead + Unpin> FingerprintSession<R> {
    pub fn new(reader: R, size: u64) -> Self {
        debug!(size, chunks = expected_chunks(size), "fingerprint started");
        Self {
            chunker: Chunker::new(reader, size),
            trie: FileTrie::new(),
        }
    }

    /// Consume one chunk. Returns `false` once the stream is drained.
    pub async fn step(&mut self) -> Result<bool> {
        let Some(chunk) = self.chunker.next_chunk().await? else {
            return Ok(false);
        };
        self.trie.insert_chunk(chunk.id, &chunk.data)?;
        trace!(chunk = %chunk.id, "chunk folded");
        Ok(true)
    }

    /// Consume the rest of the stream.
    pub async fn run(&mut self) -> Result<()> {
        while self.step().await? {}
        Ok(())
    }

    pub fn progress(&self) -> Progress {
        Progress {
            chunks_done: self.trie.chunk_count(),
            chunks_expected: expected_chunks(self.chunker.declared_size()),
            bytes_read: self.chunker.bytes_read(),
            bytes_expected: self.chunker.declared_size(),
        }
    }

    /// Root over the chunks consumed so far.
    ///
    /// This is not the file's fingerprint unless the stream is drained.
    pub fn partial_root(&self) -> Fingerprint {
        self.trie.get_root()
    }

    /// Final fingerprint. Fails with [`StorageError::Incomplete`] if the
    /// stream has not been drained.
    pub fn finish(self) -> Result<Fingerprint> {
        if !self.chunker.is_exhausted() {
            return Err(StorageError::Incomplete {
                declared: self.chunker.declared_size(),
                read: self.chunker.bytes_read(),
            });
        }
        let root = self.trie.get_root();
        debug!(chunks = self.trie.chunk_count(), root = %root, "fingerprint complete");
        Ok(root)
    }
}
