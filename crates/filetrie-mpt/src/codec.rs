//! Node encoding.
//!
//! Every node starts with a header byte whose high bits select the node kind
//! and whose low bits carry the partial-key nibble count:
//!
//! | kind                 | prefix bits | first byte |
//! |----------------------|-------------|------------|
//! | empty trie           | all         | `0x00`     |
//! | leaf, inline value   | `01`        | `0x40 + n` |
//! | branch, no value     | `10`        | `0x80 + n` |
//! | branch, inline value | `11`        | `0xc0 + n` |
//! | leaf, hashed value   | `001`       | `0x20 + n` |
//! | branch, hashed value | `0001`      | `0x10 + n` |
//!
//! Counts that do not fit the low bits continue in following bytes. File
//! tries only ever produce leaves and value-less branches. A leaf embeds its
//! value when it is at most [`MAX_INLINE_VALUE`] bytes and stores the
//! value's digest otherwise.

use filetrie_crypto::blake2;
use filetrie_crypto::encoding::compact_encode_into;
use filetrie_types::{Hash, H_LENGTH};

use crate::nibble::{pack, NIBBLE_LENGTH};

/// Encoding of the empty trie.
pub const EMPTY_TRIE: u8 = 0x00;

const LEAF_PREFIX_MASK: u8 = 0b01 << 6;
const BRANCH_WITHOUT_MASK: u8 = 0b10 << 6;
const BRANCH_WITH_MASK: u8 = 0b11 << 6;
const ALT_HASHING_LEAF_PREFIX_MASK: u8 = 0b001 << 5;
const ALT_HASHING_BRANCH_WITH_MASK: u8 = 0b0001 << 4;

/// `H([EMPTY_TRIE])`, the root of a trie with no entries.
pub const EMPTY_TRIE_ROOT: Hash = [
    0x03, 0x17, 0x0a, 0x2e, 0x75, 0x97, 0xb7, 0xb7, 0xe3, 0xd8, 0x4c, 0x05, 0x39, 0x1d, 0x13, 0x9a,
    0x62, 0xb1, 0x57, 0xe7, 0x87, 0x86, 0xd8, 0xc0, 0x82, 0xf2, 0x9d, 0xcf, 0x4c, 0x11, 0x13, 0x14,
];

/// Partial-key nibble counts are clamped to this bound.
pub const NIBBLE_SIZE_BOUND: usize = u16::MAX as usize;

/// Width of the child-presence bitmap in a branch.
pub const BITMAP_LENGTH: usize = 2;

/// Longest value stored verbatim in a leaf.
pub const MAX_INLINE_VALUE: usize = 32;

/// Node header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeHeader {
    Null,
    Branch { has_value: bool, nibble_count: usize },
    Leaf(usize),
    HashedValueBranch(usize),
    HashedValueLeaf(usize),
}

impl NodeHeader {
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match *self {
            NodeHeader::Null => out.push(EMPTY_TRIE),
            NodeHeader::Branch {
                has_value: true,
                nibble_count,
            } => size_and_prefix(out, nibble_count, BRANCH_WITH_MASK, 2),
            NodeHeader::Branch {
                has_value: false,
                nibble_count,
            } => size_and_prefix(out, nibble_count, BRANCH_WITHOUT_MASK, 2),
            NodeHeader::Leaf(nibble_count) => {
                size_and_prefix(out, nibble_count, LEAF_PREFIX_MASK, 2)
            }
            NodeHeader::HashedValueBranch(nibble_count) => {
                size_and_prefix(out, nibble_count, ALT_HASHING_BRANCH_WITH_MASK, 4)
            }
            NodeHeader::HashedValueLeaf(nibble_count) => {
                size_and_prefix(out, nibble_count, ALT_HASHING_LEAF_PREFIX_MASK, 3)
            }
        }
    }
}

/// Write `prefix | size` with continuation bytes for large sizes.
///
/// With `max = 255 >> prefix_bits`, sizes below `max` fit the first byte.
/// Otherwise the first byte saturates and the excess over `max - 1` follows
/// as a run of `255` bytes terminated by one byte below `255`.
fn size_and_prefix(out: &mut Vec<u8>, size: usize, prefix: u8, prefix_bits: u32) {
    let size = size.min(NIBBLE_SIZE_BOUND);
    let max_value = 255u8 >> prefix_bits;
    let l1 = (max_value as usize - 1).min(size);
    if size == l1 {
        out.push(prefix + l1 as u8);
        return;
    }
    out.push(prefix + max_value);
    let mut rem = size - l1;
    while rem >= 256 {
        out.push(255);
        rem -= 255;
    }
    out.push((rem - 1) as u8);
}

/// Reference from a branch to one of its children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildRef {
    /// Digest of a child encoding of at least [`H_LENGTH`] bytes.
    Hash(Hash),
    /// A shorter child encoding embedded verbatim.
    Inline(Vec<u8>),
}

impl ChildRef {
    pub fn from_encoding(encoding: Vec<u8>) -> Self {
        if encoding.len() >= H_LENGTH {
            ChildRef::Hash(blake2::hash(&encoding))
        } else {
            ChildRef::Inline(encoding)
        }
    }

    /// Digest of the referenced node when it is the trie root.
    ///
    /// Roots are always hashed, inline or not.
    pub fn root_hash(&self) -> Hash {
        match self {
            ChildRef::Hash(hash) => *hash,
            ChildRef::Inline(encoding) => blake2::hash(encoding),
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        let bytes: &[u8] = match self {
            ChildRef::Hash(hash) => hash,
            ChildRef::Inline(encoding) => encoding,
        };
        compact_encode_into(out, bytes.len() as u64);
        out.extend_from_slice(bytes);
    }
}

/// Value held by a leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Raw bytes, at most [`MAX_INLINE_VALUE`] long.
    Inline(Vec<u8>),
    /// Digest of a longer value.
    Hashed(Hash),
}

impl Value {
    /// Store `bytes` inline when short enough, otherwise by digest.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.len() > MAX_INLINE_VALUE {
            Value::Hashed(blake2::hash(bytes))
        } else {
            Value::Inline(bytes.to_vec())
        }
    }

    /// Digest of the value's bytes.
    pub fn hash(&self) -> Hash {
        match self {
            Value::Inline(bytes) => blake2::hash(bytes),
            Value::Hashed(hash) => *hash,
        }
    }
}

impl From<Hash> for Value {
    fn from(hash: Hash) -> Self {
        Value::Hashed(hash)
    }
}

fn partial_with_header(partial: &[u8], header: NodeHeader) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + partial.len() / 2 + H_LENGTH);
    header.encode_into(&mut out);
    out.extend_from_slice(&pack(partial));
    out
}

/// `header || partial || compact(len) || value` for inline values,
/// `header || partial || value_hash` for hashed ones.
pub fn encode_leaf(partial: &[u8], value: &Value) -> Vec<u8> {
    match value {
        Value::Inline(bytes) => {
            let mut out = partial_with_header(partial, NodeHeader::Leaf(partial.len()));
            compact_encode_into(&mut out, bytes.len() as u64);
            out.extend_from_slice(bytes);
            out
        }
        Value::Hashed(hash) => {
            let mut out =
                partial_with_header(partial, NodeHeader::HashedValueLeaf(partial.len()));
            out.extend_from_slice(hash);
            out
        }
    }
}

/// `header || partial || bitmap || child references`, for a branch without
/// a value.
pub fn encode_branch<'a>(
    partial: &[u8],
    children: impl Iterator<Item = Option<&'a ChildRef>>,
) -> Vec<u8> {
    let mut out = partial_with_header(
        partial,
        NodeHeader::Branch {
            has_value: false,
            nibble_count: partial.len(),
        },
    );
    let bitmap_index = out.len();
    out.extend_from_slice(&[0u8; BITMAP_LENGTH]);

    let mut bitmap: u16 = 0;
    for (index, child) in children.take(NIBBLE_LENGTH).enumerate() {
        if let Some(child) = child {
            bitmap |= 1 << index;
            child.encode_into(&mut out);
        }
    }
    out[bitmap_index..bitmap_index + BITMAP_LENGTH].copy_from_slice(&bitmap.to_le_bytes());
    out
}

/// Root of a trie with no entries, computed with the live hash backend.
///
/// Equal to [`EMPTY_TRIE_ROOT`] when the backend is correct.
pub fn empty_trie_root() -> Hash {
    blake2::hash(&[EMPTY_TRIE])
}
