//! 1 KiB chunk splitting.
//!
//! A [`Chunker`] pulls a file of known size from an async reader and yields
//! it as consecutive chunks of exactly [`CHUNK_SIZE`] bytes, except for a
//! shorter final chunk when the size is not a multiple of the chunk size.
//! Chunk indices start at zero and have no gaps.
//!
//! The declared size is authoritative: a stream that ends early or carries
//! trailing bytes is reported as [`StorageError::SizeMismatch`] instead of
//! being fingerprinted.

use filetrie_types::{Chunk, ChunkId, CHUNK_SIZE};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::warn;

use crate::{Result, StorageError};

/// Number of chunks a file of `file_size` bytes splits into.
pub fn expected_chunks(file_size: u64) -> u64 {
    file_size.div_ceil(CHUNK_SIZE as u64)
}

/// Split an in-memory buffer the same way a [`Chunker`] splits a stream.
pub fn split_bytes(data: &[u8]) -> impl Iterator<Item = Chunk> + '_ {
    data.chunks(CHUNK_SIZE)
        .enumerate()
        .map(|(i, bytes)| Chunk::new(ChunkId::new(i as u64), bytes.to_vec()))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Reading,
    Exhausted,
    Failed,
}

/// Streaming splitter over an async reader of a declared length.
pub struct Chunker<R> {
    reader: R,
    declared_size: u64,
    bytes_read: u64,
    /// Chunks yielded so far; also the index of the next one.
    chunks: u64,
    state: State,
}

impl<R: AsyncRead + Unpin> Chunker<R> {
    pub fn new(reader: R, declared_size: u64) -> Self {
        Self {
            reader,
            declared_size,
            bytes_read: 0,
            chunks: 0,
            state: State::Reading,
        }
    }

    /// Next chunk, or `None` once all `declared_size` bytes have been
    /// yielded and the stream is confirmed to be at its end.
    ///
    /// After an error the chunker is poisoned and yields `None`.
    pub async fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        if self.state != State::Reading {
            return Ok(None);
        }

        let remaining = self.declared_size - self.bytes_read;
        if remaining == 0 {
            self.confirm_end().await?;
            return Ok(None);
        }

        let want = remaining.min(CHUNK_SIZE as u64) as usize;
        let mut buf = vec![0u8; want];
        let mut filled = 0;
        while filled < want {
            match self.reader.read(&mut buf[filled..]).await {
                Ok(0) => {
                    let read = self.bytes_read + filled as u64;
                    return Err(self.mismatch(read));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.state = State::Failed;
                    return Err(StorageError::StreamRead(e));
                }
            }
        }

        self.bytes_read += want as u64;
        // At most `u64::MAX / CHUNK_SIZE` chunks, so the count cannot wrap.
        let id = ChunkId::new(self.chunks);
        self.chunks += 1;
        Ok(Some(Chunk::new(id, buf)))
    }

    /// Read once more to confirm nothing follows the declared end.
    async fn confirm_end(&mut self) -> Result<()> {
        let mut extra = [0u8; 1];
        loop {
            match self.reader.read(&mut extra).await {
                Ok(0) => {
                    self.state = State::Exhausted;
                    return Ok(());
                }
                Ok(n) => {
                    let read = self.declared_size + n as u64;
                    return Err(self.mismatch(read));
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.state = State::Failed;
                    return Err(StorageError::StreamRead(e));
                }
            }
        }
    }

    fn mismatch(&mut self, read: u64) -> StorageError {
        self.state = State::Failed;
        warn!(
            declared = self.declared_size,
            read, "stream length differs from declared size"
        );
        StorageError::SizeMismatch {
            declared: self.declared_size,
            read,
        }
    }

    /// Whether every declared byte was yielded and the stream has ended.
    pub fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }

    /// Chunks yielded so far.
    pub fn chunk_count(&self) -> u64 {
        self.chunks
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn declared_size(&self) -> u64 {
        self.declared_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{content, Trickle};

    async fn collect<R: AsyncRead + Unpin>(chunker: &mut Chunker<R>) -> Result<Vec<Chunk>> {
        let mut out = Vec::new();
        while let Some(chunk) = chunker.next_chunk().await? {
            out.push(chunk);
        }
        Ok(out)
    }

    #[test]
    fn test_expected_chunks() {
        assert_eq!(expected_chunks(0), 0);
        assert_eq!(expected_chunks(1), 1);
        assert_eq!(expected_chunks(1024), 1);
        assert_eq!(expected_chunks(1025), 2);
        assert_eq!(expected_chunks(10 * 1024), 10);
    }

    #[tokio::test]
    async fn test_sizes_at_chunk_boundaries() {
        for size in [1usize, 1023, 1024, 1025, 2048, 3000] {
            let data = content(size, 7);
            let mut chunker = Chunker::new(Trickle::new(data.clone(), 100), size as u64);
            let chunks = collect(&mut chunker).await.expect("chunk");

            assert_eq!(chunks.len() as u64, expected_chunks(size as u64), "size {size}");
            for (i, c) in chunks.iter().enumerate() {
                assert_eq!(c.id, ChunkId::new(i as u64));
                if i + 1 < chunks.len() {
                    assert_eq!(c.len(), CHUNK_SIZE);
                }
            }
            let joined: Vec<u8> = chunks.into_iter().flat_map(|c| c.data).collect();
            assert_eq!(joined, data);
            assert!(chunker.is_exhausted());
            assert_eq!(chunker.bytes_read(), size as u64);
        }
    }

    #[tokio::test]
    async fn test_empty_stream_yields_nothing() {
        let mut chunker = Chunker::new(Trickle::new(Vec::new(), 1), 0);
        assert!(chunker.next_chunk().await.expect("chunk").is_none());
        assert!(chunker.is_exhausted());
        assert_eq!(chunker.chunk_count(), 0);
    }

    #[tokio::test]
    async fn test_short_stream_is_size_mismatch() {
        let mut chunker = Chunker::new(Trickle::new(content(1500, 1), 256), 2048);
        let err = collect(&mut chunker).await.expect_err("short stream");
        assert!(matches!(
            err,
            StorageError::SizeMismatch {
                declared: 2048,
                read: 1500
            }
        ));
        assert!(!chunker.is_exhausted());
        assert!(chunker.next_chunk().await.expect("poisoned").is_none());
    }

    #[tokio::test]
    async fn test_trailing_bytes_are_size_mismatch() {
        let mut chunker = Chunker::new(Trickle::new(content(1030, 1), 4096), 1024);
        let first = chunker.next_chunk().await.expect("chunk").expect("one chunk");
        assert_eq!(first.len(), 1024);
        let err = chunker.next_chunk().await.expect_err("extra data");
        assert!(matches!(
            err,
            StorageError::SizeMismatch {
                declared: 1024,
                read: 1025
            }
        ));
    }

    #[tokio::test]
    async fn test_reader_error_propagates() {
        let reader = Trickle::new(content(4096, 3), 512).failing_at(1536);
        let mut chunker = Chunker::new(reader, 4096);
        assert!(chunker.next_chunk().await.expect("first").is_some());
        let err = chunker.next_chunk().await.expect_err("aborted");
        assert!(matches!(err, StorageError::StreamRead(_)));
    }

    #[test]
    fn test_split_bytes_matches_layout() {
        let data = content(2500, 9);
        let chunks: Vec<Chunk> = split_bytes(&data).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].id, ChunkId::new(2));
        assert_eq!(chunks[2].len(), 2500 - 2048);
        assert_eq!(split_bytes(&[]).count(), 0);
    }
}
