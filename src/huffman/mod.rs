/// Huffman coding is a method of encoding where symbols are assigned a code,
/// and more commonly used symbols get shorter codes, and less commonly
/// used symbols get longer codes. Codes are prefix free, meaning no code
/// is the start of another code.
mod tree_builder;
mod tree_codec;
pub use tree_builder::*;
pub use tree_codec::*;

use core::fmt;
use core::hash::Hash;
use std::collections::HashMap;

/// Codewords are held in a `u64`, so no leaf may sit deeper than this.
pub const MAX_TREE_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode<T> {
    Leaf {
        element: T,
        frequency: u64,
    },
    Internal {
        /// Reached with a 0 bit
        left: Box<TreeNode<T>>,
        /// Reached with a 1 bit
        right: Box<TreeNode<T>>,
        frequency: u64,
    },
}

impl<T> TreeNode<T> {
    pub fn leaf(element: T, frequency: u64) -> Self {
        TreeNode::Leaf { element, frequency }
    }

    /// Combine two nodes under a new parent whose frequency is the sum of both.
    pub fn merge(left: TreeNode<T>, right: TreeNode<T>) -> Self {
        let frequency = left.frequency() + right.frequency();
        TreeNode::Internal {
            left: Box::new(left),
            right: Box::new(right),
            frequency,
        }
    }

    pub fn frequency(&self) -> u64 {
        match self {
            TreeNode::Leaf { frequency, .. } | TreeNode::Internal { frequency, .. } => *frequency,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// The element found by following left children until a leaf is reached.
    pub fn leftmost_element(&self) -> &T {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { element, .. } => return element,
                TreeNode::Internal { left, .. } => node = &**left,
            }
        }
    }

    /// Length of the longest root to leaf path. A lone leaf has height 0.
    pub fn height(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Internal { left, right, .. } => 1 + left.height().max(right.height()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

/// The path from the root to a leaf, 0 for left and 1 for right.
///
/// The first step of the path is the most significant of the `len` lower bits of
/// `bits`, matching the order [`crate::encoding::bit_writer::BitWriter::write_bits`]
/// writes them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodeWord {
    bits: u64,
    len: u8,
}

impl CodeWord {
    /// The zero length codeword, used for the root.
    pub fn empty() -> Self {
        CodeWord::default()
    }

    /// This codeword extended by one step. Callers make sure the length stays
    /// within [`MAX_TREE_DEPTH`].
    pub fn child(self, bit: bool) -> Self {
        CodeWord {
            bits: (self.bits << 1) | u64::from(bit),
            len: self.len + 1,
        }
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn len(&self) -> u8 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `self` is a prefix of (or equal to) `other`.
    pub fn is_prefix_of(&self, other: &CodeWord) -> bool {
        if self.len == 0 {
            return true;
        }
        self.len <= other.len && (other.bits >> (other.len - self.len)) == self.bits
    }

    /// The steps of the path in order, `true` for right.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).rev().map(move |shift| (self.bits >> shift) & 1 == 1)
    }
}

impl fmt::Display for CodeWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Maps every leaf element to its codeword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable<T: Eq + Hash> {
    codes: HashMap<T, CodeWord>,
}

impl<T: Eq + Hash> CodeTable<T> {
    pub(crate) fn new() -> Self {
        CodeTable {
            codes: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, element: T, code: CodeWord) {
        self.codes.insert(element, code);
    }

    pub fn get(&self, element: &T) -> Option<&CodeWord> {
        self.codes.get(element)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &CodeWord)> {
        self.codes.iter()
    }
}
