//! # filetrie-crypto
//!
//! Hash and byte-encoding primitives shared by every filetrie crate.
//!
//! The suite is fixed: there is exactly one hash function (Blake2b with a
//! 256-bit digest) and one integer encoding per purpose. Any deviation
//! produces fingerprints and file keys that other nodes on the network will
//! not recognise.
//!
//! ## Modules
//!
//! - [`blake2`] — Blake2b-256 hashing
//! - [`encoding`] — compact integers, length-prefixed fields, `0x` hex

pub mod blake2;
pub mod encoding;

/// Error types for hashing and encoding operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Input was not valid hexadecimal.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Input decoded to the wrong number of bytes.
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A length-prefixed field does not fit its prefix.
    #[error("field too long for a 32-bit length prefix: {0} bytes")]
    FieldTooLong(usize),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
