//! Nibble paths.
//!
//! Keys are walked four bits at a time, high nibble of each byte first.

use std::ops::Deref;

/// Number of children of a branch node.
pub const NIBBLE_LENGTH: usize = 16;

/// Owned sequence of nibbles, each in `0..16`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Nibbles(Vec<u8>);

impl Nibbles {
    /// Expand key bytes into nibbles.
    pub fn from_key(key: &[u8]) -> Self {
        let mut nibbles = Vec::with_capacity(key.len() * 2);
        for byte in key {
            nibbles.push(byte >> 4);
            nibbles.push(byte & 0x0f);
        }
        Self(nibbles)
    }

    /// Pack into bytes for a node's partial key.
    ///
    /// An odd count is padded on the left: the first byte carries the first
    /// nibble in its low half.
    pub fn pack(&self) -> Vec<u8> {
        pack(&self.0)
    }
}

impl Deref for Nibbles {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Nibbles {
    /// Copy a nibble slice (not key bytes; see [`Nibbles::from_key`]).
    fn from(nibbles: &[u8]) -> Self {
        Self(nibbles.to_vec())
    }
}

/// Pack a nibble slice, left-padding odd lengths.
pub fn pack(nibbles: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(nibbles.len().div_ceil(2));
    let rest = if nibbles.len() % 2 == 1 {
        out.push(nibbles[0]);
        &nibbles[1..]
    } else {
        nibbles
    };
    for pair in rest.chunks_exact(2) {
        out.push((pair[0] << 4) | pair[1]);
    }
    out
}

/// Length of the longest common prefix of two nibble slices.
pub fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
