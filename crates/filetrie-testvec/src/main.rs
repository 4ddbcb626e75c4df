//! Test vector generator for fingerprints and file keys.
//!
//! Generates `test_vectors.json` covering the hash primitive, the compact
//! integer encoding, trie roots and file key derivation. Any implementation
//! that must interoperate with this one checks itself against that file.
//!
//! Usage:
//!   filetrie-testvec              # Generate test_vectors.json
//!   filetrie-testvec --verify     # Verify the committed vectors still hold

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use filetrie_crypto::{blake2, encoding};
use filetrie_mpt::FileTrie;
use filetrie_storage::{fingerprint_bytes, FileMetadata};
use filetrie_types::{BucketId, Fingerprint, CHUNK_SIZE};
use serde::{Deserialize, Serialize};

const VECTORS_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../tests/fixtures/test_vectors.json"
);

#[derive(Debug, Serialize, Deserialize)]
struct TestVectors {
    version: String,
    generated_by: String,
    vectors: BTreeMap<String, TestVector>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TestVector {
    description: String,
    inputs: BTreeMap<String, String>,
    outputs: BTreeMap<String, String>,
}

type Generated = Result<BTreeMap<String, TestVector>>;

/// Bytes `0, 1, 2, ...` wrapping at 256, offset by `seed`.
fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_add(seed)).collect()
}

fn generate_blake2_vectors() -> BTreeMap<String, TestVector> {
    let mut vectors = BTreeMap::new();

    vectors.insert(
        "blake2_256_empty".to_string(),
        TestVector {
            description: "Blake2b-256 of the empty input".to_string(),
            inputs: BTreeMap::from([("data".to_string(), String::new())]),
            outputs: BTreeMap::from([("hash".to_string(), hex::encode(blake2::hash(b"")))]),
        },
    );

    let data = b"filetrie test vector 1";
    vectors.insert(
        "blake2_256_basic".to_string(),
        TestVector {
            description: "Blake2b-256(b\"filetrie test vector 1\")".to_string(),
            inputs: BTreeMap::from([("data".to_string(), hex::encode(data))]),
            outputs: BTreeMap::from([("hash".to_string(), hex::encode(blake2::hash(data)))]),
        },
    );

    vectors
}

fn generate_compact_vectors() -> BTreeMap<String, TestVector> {
    let mut vectors = BTreeMap::new();

    // One value at each mode boundary.
    for value in [0u64, 63, 64, 16_383, 16_384, (1 << 30) - 1, 1 << 30, u64::MAX] {
        vectors.insert(
            format!("compact_{value}"),
            TestVector {
                description: format!("Compact encoding of {value}"),
                inputs: BTreeMap::from([("value".to_string(), value.to_string())]),
                outputs: BTreeMap::from([(
                    "encoded".to_string(),
                    hex::encode(encoding::compact_encode(value)),
                )]),
            },
        );
    }

    vectors
}

fn generate_trie_vectors() -> Generated {
    let mut vectors = BTreeMap::new();

    vectors.insert(
        "trie_empty_root".to_string(),
        TestVector {
            description: "Root of a file with no chunks".to_string(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::from([(
                "root".to_string(),
                FileTrie::new().get_root().to_string(),
            )]),
        },
    );

    let chunk = pattern(CHUNK_SIZE, 0);
    let mut trie = FileTrie::new();
    trie.push_chunk(&chunk).context("push chunk 0")?;
    vectors.insert(
        "trie_single_chunk".to_string(),
        TestVector {
            description: "One full chunk of bytes 0x00..0xff repeated".to_string(),
            inputs: BTreeMap::from([("chunk_0".to_string(), hex::encode(&chunk))]),
            outputs: BTreeMap::from([
                ("chunk_0_hash".to_string(), hex::encode(blake2::hash(&chunk))),
                ("root".to_string(), trie.get_root().to_string()),
            ]),
        },
    );

    let tail = pattern(10, 1);
    trie.push_chunk(&tail).context("push chunk 1")?;
    vectors.insert(
        "trie_two_chunks".to_string(),
        TestVector {
            description: "The single-chunk file followed by a 10-byte chunk".to_string(),
            inputs: BTreeMap::from([
                ("chunk_0".to_string(), hex::encode(&chunk)),
                ("chunk_1".to_string(), hex::encode(&tail)),
            ]),
            outputs: BTreeMap::from([("root".to_string(), trie.get_root().to_string())]),
        },
    );

    // Enough chunks for several branch levels and a short tail.
    let file = pattern(300 * CHUNK_SIZE + 123, 7);
    vectors.insert(
        "trie_patterned_file".to_string(),
        TestVector {
            description: "Fingerprint of 307323 bytes of (i + 7) mod 256".to_string(),
            inputs: BTreeMap::from([
                ("length".to_string(), file.len().to_string()),
                ("seed".to_string(), "7".to_string()),
            ]),
            outputs: BTreeMap::from([(
                "root".to_string(),
                fingerprint_bytes(&file)
                    .context("fingerprint patterned file")?
                    .to_string(),
            )]),
        },
    );

    Ok(vectors)
}

fn generate_file_key_vectors() -> Generated {
    let mut vectors = BTreeMap::new();

    let owner = b"5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    let meta = FileMetadata::new(
        owner.to_vec(),
        BucketId::default(),
        b"test".to_vec(),
        4,
        Fingerprint::default(),
    );
    vectors.insert(
        "file_key_test_location".to_string(),
        TestVector {
            description: "File key for location \"test\", size 4, zero bucket and fingerprint"
                .to_string(),
            inputs: BTreeMap::from([
                ("owner".to_string(), hex::encode(owner)),
                ("bucket_id".to_string(), meta.bucket_id.to_string()),
                ("location".to_string(), hex::encode(&meta.location)),
                ("file_size".to_string(), meta.file_size.to_string()),
                ("fingerprint".to_string(), meta.fingerprint.to_string()),
            ]),
            outputs: BTreeMap::from([
                (
                    "encoded".to_string(),
                    hex::encode(meta.encode().context("encode metadata")?),
                ),
                (
                    "file_key".to_string(),
                    meta.file_key().context("derive file key")?.to_string(),
                ),
            ]),
        },
    );

    Ok(vectors)
}

fn generate_all_vectors() -> Result<TestVectors> {
    let mut all_vectors = BTreeMap::new();

    all_vectors.extend(generate_blake2_vectors());
    all_vectors.extend(generate_compact_vectors());
    all_vectors.extend(generate_trie_vectors()?);
    all_vectors.extend(generate_file_key_vectors()?);

    Ok(TestVectors {
        version: "1.0".to_string(),
        generated_by: "filetrie-testvec".to_string(),
        vectors: all_vectors,
    })
}

fn verify_vectors(vectors: &TestVectors) -> Result<bool> {
    let regenerated = generate_all_vectors()?;
    let mut all_pass = true;

    for (name, expected) in &vectors.vectors {
        if let Some(actual) = regenerated.vectors.get(name) {
            if actual.outputs != expected.outputs {
                eprintln!("FAIL: {name}");
                eprintln!("  expected: {:?}", expected.outputs);
                eprintln!("  actual:   {:?}", actual.outputs);
                all_pass = false;
            } else {
                eprintln!("PASS: {name}");
            }
        } else {
            eprintln!("MISSING: {name}");
            all_pass = false;
        }
    }
    for name in regenerated.vectors.keys() {
        if !vectors.vectors.contains_key(name) {
            eprintln!("UNRECORDED: {name}");
            all_pass = false;
        }
    }

    Ok(all_pass)
}

fn read_vectors(path: &str) -> Result<TestVectors> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read test vectors at {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("parse test vectors at {path}"))
}

fn write_vectors(vectors: &TestVectors) -> Result<()> {
    if let Some(parent) = Path::new(VECTORS_PATH).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(vectors).context("serialize test vectors")?;
    std::fs::write(VECTORS_PATH, json + "\n")
        .with_context(|| format!("write test vectors to {VECTORS_PATH}"))?;
    eprintln!("Generated {} test vectors to {VECTORS_PATH}", vectors.vectors.len());
    Ok(())
}

fn run() -> Result<bool> {
    if std::env::args().any(|a| a == "--verify") {
        let vectors = read_vectors(VECTORS_PATH)?;
        return verify_vectors(&vectors);
    }

    let vectors = generate_all_vectors()?;
    write_vectors(&vectors)?;
    verify_vectors(&vectors)
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => {
            eprintln!("All test vectors verified successfully.");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            eprintln!("Test vector verification FAILED.");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_committed_vectors_match_generator() {
        let committed = read_vectors(VECTORS_PATH).expect("committed vectors");
        assert_eq!(committed.version, "1.0");
        assert!(verify_vectors(&committed).expect("regenerate"));
    }

    #[test]
    fn test_missing_vectors_file_is_an_error() {
        let err = read_vectors("/nonexistent/test_vectors.json").expect_err("missing file");
        assert!(err.to_string().contains("read test vectors"));
    }
}
