//! Integration test: file on disk → chunker → trie → fingerprint.
//!
//! Exercises the pipeline end to end:
//! 1. Write a multi-chunk file to a temporary directory
//! 2. Fingerprint it through `FileSource` and the shared engine
//! 3. Rebuild the same root by hand from the chunk hashes
//! 4. Fingerprint many files concurrently and compare with sequential runs
//! 5. Truncate a file behind the source's back and expect a size mismatch

use std::path::PathBuf;

use filetrie_crypto::blake2;
use filetrie_mpt::{empty_root, FileTrie};
use filetrie_storage::{
    engine, fingerprint, fingerprint_all, fingerprint_bytes, split_bytes, ByteSource, FileSource,
    FingerprintSession, StorageError,
};
use filetrie_types::CHUNK_SIZE;
use rand::{Rng, SeedableRng};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("filetrie-it-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill(&mut data[..]);
    data
}

#[tokio::test]
#[ignore]
async fn file_on_disk_matches_manual_trie() {
    let dir = scratch_dir("manual");
    let data = random_bytes(37 * CHUNK_SIZE + 511, 1);
    let path = dir.join("photo.jpg");
    tokio::fs::write(&path, &data).await.expect("write file");

    // =========================================================
    // Step 1: Fingerprint through the engine
    // =========================================================
    let engine = engine().await.expect("engine");
    let source = FileSource::new(&path).await.expect("stat");
    assert_eq!(source.size(), data.len() as u64);
    let root = engine.fingerprint(&source).await.expect("fingerprint");

    // =========================================================
    // Step 2: Rebuild from chunk hashes
    // =========================================================
    let mut trie = FileTrie::new();
    for chunk in split_bytes(&data) {
        trie.insert_chunk(chunk.id, &chunk.data).expect("insert");
        assert_eq!(trie.chunk_hash(chunk.id), Some(blake2::hash(&chunk.data)));
    }
    assert_eq!(trie.chunk_count(), 38);
    assert_eq!(trie.get_root(), root);

    // =========================================================
    // Step 3: Reopening the same file is idempotent
    // =========================================================
    assert_eq!(fingerprint(&source).await.expect("again"), root);
    assert_eq!(fingerprint_bytes(&data).expect("in memory"), root);

    std::fs::remove_dir_all(&dir).expect("cleanup");
}

#[tokio::test]
#[ignore]
async fn empty_file_has_empty_root() {
    let dir = scratch_dir("empty");
    let path = dir.join("empty.bin");
    tokio::fs::write(&path, b"").await.expect("write file");

    let source = FileSource::new(&path).await.expect("stat");
    let root = fingerprint(&source).await.expect("fingerprint");
    assert_eq!(root, empty_root());
    assert_eq!(root, engine().await.expect("engine").empty_root());

    std::fs::remove_dir_all(&dir).expect("cleanup");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn concurrent_fingerprints_match_sequential() {
    let dir = scratch_dir("concurrent");
    let mut sources = Vec::new();
    let mut expected = Vec::new();
    for i in 0..24u64 {
        let data = random_bytes((i as usize) * 777 + 1, i);
        let path = dir.join(format!("file-{i}.bin"));
        tokio::fs::write(&path, &data).await.expect("write file");
        sources.push(FileSource::new(&path).await.expect("stat"));
        expected.push(fingerprint_bytes(&data).expect("in memory"));
    }

    let results = fingerprint_all(sources, 5).await;
    assert_eq!(results.len(), expected.len());
    for (i, (result, want)) in results.into_iter().zip(expected).enumerate() {
        assert_eq!(result.expect("fingerprint"), want, "file {i}");
    }

    std::fs::remove_dir_all(&dir).expect("cleanup");
}

#[tokio::test]
#[ignore]
async fn file_shrunk_after_stat_is_size_mismatch() {
    let dir = scratch_dir("shrunk");
    let path = dir.join("log.txt");
    tokio::fs::write(&path, random_bytes(5000, 9))
        .await
        .expect("write file");
    let source = FileSource::new(&path).await.expect("stat");

    tokio::fs::write(&path, random_bytes(3000, 9))
        .await
        .expect("truncate");
    let err = fingerprint(&source).await.expect_err("shrunk");
    assert!(matches!(
        err,
        StorageError::SizeMismatch {
            declared: 5000,
            read: 3000
        }
    ));

    std::fs::remove_dir_all(&dir).expect("cleanup");
}

#[tokio::test]
#[ignore]
async fn session_reports_progress_over_a_file() {
    let dir = scratch_dir("session");
    let data = random_bytes(10 * CHUNK_SIZE, 4);
    let path = dir.join("video.bin");
    tokio::fs::write(&path, &data).await.expect("write file");

    let source = FileSource::new(&path).await.expect("stat");
    let reader = source.open().await.expect("open");
    let mut session = FingerprintSession::new(reader, source.size());

    let mut seen = 0;
    while session.step().await.expect("step") {
        seen += 1;
        let progress = session.progress();
        assert_eq!(progress.chunks_done, seen);
        assert_eq!(
            session.partial_root(),
            fingerprint_bytes(&data[..seen as usize * CHUNK_SIZE]).expect("prefix")
        );
    }
    assert_eq!(session.progress().to_string(), "10 of 10 chunks");
    assert_eq!(
        session.finish().expect("finish"),
        fingerprint_bytes(&data).expect("in memory")
    );

    std::fs::remove_dir_all(&dir).expect("cleanup");
}
