//! In-memory trie nodes and radix insertion.
//!
//! An extension always leads to a branch, so the pair is encoded as a single
//! branch carrying the extension's path as its partial key. Keys have a fixed
//! width, hence a branch never holds a value and two distinct keys always
//! diverge before either ends.

use std::cell::OnceCell;

use crate::codec::{encode_branch, encode_leaf, ChildRef, Value};
use crate::nibble::{common_prefix, Nibbles, NIBBLE_LENGTH};

pub(crate) struct Leaf {
    pub(crate) partial: Nibbles,
    pub(crate) value: Value,
}

pub(crate) struct Branch {
    pub(crate) children: [Option<Box<Node>>; NIBBLE_LENGTH],
}

pub(crate) struct Extension {
    pub(crate) partial: Nibbles,
    pub(crate) branch: Branch,
}

pub(crate) enum NodeKind {
    Leaf(Leaf),
    Extension(Extension),
    Branch(Branch),
}

pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    /// Reference to this node's encoding. Nodes on an insertion path are
    /// rebuilt, so a populated cell is never stale.
    reference: OnceCell<ChildRef>,
}

impl Node {
    fn new(kind: NodeKind) -> Box<Self> {
        Box::new(Self {
            kind,
            reference: OnceCell::new(),
        })
    }

    pub(crate) fn leaf(partial: Nibbles, value: Value) -> Box<Self> {
        Self::new(NodeKind::Leaf(Leaf { partial, value }))
    }

    /// An extension over `branch`, or the bare branch when `partial` is empty.
    fn extension(partial: Nibbles, branch: Branch) -> Box<Self> {
        if partial.is_empty() {
            Self::new(NodeKind::Branch(branch))
        } else {
            Self::new(NodeKind::Extension(Extension { partial, branch }))
        }
    }

    /// Insert `value` at the remaining nibble path `key`.
    ///
    /// Returns the replacement node and whether the key was new.
    pub(crate) fn insert(self: Box<Self>, key: &[u8], value: Value) -> (Box<Self>, bool) {
        let node = *self;
        match node.kind {
            NodeKind::Leaf(leaf) => {
                let common = common_prefix(&leaf.partial, key);
                if common == leaf.partial.len() {
                    return (Self::leaf(leaf.partial, value), false);
                }
                let mut branch = Branch::empty();
                branch.children[leaf.partial[common] as usize] =
                    Some(Self::leaf(Nibbles::from(&leaf.partial[common + 1..]), leaf.value));
                branch.children[key[common] as usize] =
                    Some(Self::leaf(Nibbles::from(&key[common + 1..]), value));
                (Self::extension(Nibbles::from(&key[..common]), branch), true)
            }
            NodeKind::Extension(ext) => {
                let common = common_prefix(&ext.partial, key);
                if common == ext.partial.len() {
                    let (branch, added) = ext.branch.insert(&key[common..], value);
                    return (Self::extension(ext.partial, branch), added);
                }
                let mut branch = Branch::empty();
                branch.children[ext.partial[common] as usize] = Some(Self::extension(
                    Nibbles::from(&ext.partial[common + 1..]),
                    ext.branch,
                ));
                branch.children[key[common] as usize] =
                    Some(Self::leaf(Nibbles::from(&key[common + 1..]), value));
                (Self::extension(Nibbles::from(&key[..common]), branch), true)
            }
            NodeKind::Branch(branch) => {
                let (branch, added) = branch.insert(key, value);
                (Self::new(NodeKind::Branch(branch)), added)
            }
        }
    }

    /// Value stored at the remaining nibble path `key`, if any.
    pub(crate) fn get(&self, key: &[u8]) -> Option<&Value> {
        match &self.kind {
            NodeKind::Leaf(leaf) => (*leaf.partial == *key).then_some(&leaf.value),
            NodeKind::Extension(ext) => ext.branch.get(key.strip_prefix(&*ext.partial)?),
            NodeKind::Branch(branch) => branch.get(key),
        }
    }

    /// Hash or inline reference to this node's encoding, computed once.
    pub(crate) fn reference(&self) -> &ChildRef {
        self.reference
            .get_or_init(|| ChildRef::from_encoding(self.encode()))
    }

    fn encode(&self) -> Vec<u8> {
        match &self.kind {
            NodeKind::Leaf(leaf) => encode_leaf(&leaf.partial, &leaf.value),
            NodeKind::Extension(ext) => encode_branch(&ext.partial, ext.branch.child_refs()),
            NodeKind::Branch(branch) => encode_branch(&[], branch.child_refs()),
        }
    }
}

impl Branch {
    fn empty() -> Self {
        Self {
            children: Default::default(),
        }
    }

    fn insert(mut self, key: &[u8], value: Value) -> (Self, bool) {
        // Fixed-width keys never end at a branch.
        let Some((&nibble, rest)) = key.split_first() else {
            return (self, false);
        };
        let slot = &mut self.children[nibble as usize];
        let (child, added) = match slot.take() {
            Some(child) => child.insert(rest, value),
            None => (Node::leaf(Nibbles::from(rest), value), true),
        };
        *slot = Some(child);
        (self, added)
    }

    fn get(&self, key: &[u8]) -> Option<&Value> {
        let (&nibble, rest) = key.split_first()?;
        self.children[nibble as usize].as_deref()?.get(rest)
    }

    fn child_refs(&self) -> impl Iterator<Item = Option<&ChildRef>> {
        self.children
            .iter()
            .map(|child| child.as_deref().map(Node::reference))
    }
}
