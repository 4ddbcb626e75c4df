//! Integration test crate for filetrie.
//!
//! This crate has no library code. It only contains integration tests
//! that exercise the file → fingerprint → file key pipeline across the
//! workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p filetrie-integration-tests -- --ignored
//! ```
//!
//! The reference-file tests additionally need `FILETRIE_FIXTURES_DIR`
//! pointing at a directory with `adolphus.jpg`, `smile.jpg` and an
//! `expected_roots.json` mapping each file name to its published root.
