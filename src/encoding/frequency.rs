//! Contains [`FrequencyTable`], the result of the first pass over a source.

use crate::huffman::TreeNode;
use core::hash::Hash;
use std::collections::HashMap;

/// How often each distinct element occurs in a source.
///
/// Only elements that were actually seen have an entry, and every entry is at
/// least 1. The iteration order is unspecified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<T: Eq + Hash> {
    counts: HashMap<T, u64>,
    total: u64,
}

impl<T: Eq + Hash> FrequencyTable<T> {
    /// Count all elements in one pass.
    pub fn count<I: IntoIterator<Item = T>>(elements: I) -> Self {
        let result: Result<Self, core::convert::Infallible> =
            Self::try_count(elements.into_iter().map(Ok));
        match result {
            Ok(table) => table,
            Err(never) => match never {},
        }
    }

    /// Count all elements in one pass, stopping at the first error.
    pub fn try_count<I, E>(elements: I) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<T, E>>,
    {
        let mut counts = HashMap::new();
        let mut total = 0;
        for element in elements {
            *counts.entry(element?).or_insert(0) += 1;
            total += 1;
        }
        Ok(FrequencyTable { counts, total })
    }

    pub fn get(&self, element: &T) -> Option<u64> {
        self.counts.get(element).copied()
    }

    /// Number of elements counted, duplicates included.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct elements.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, u64)> {
        self.counts.iter().map(|(element, count)| (element, *count))
    }

    /// One leaf per distinct element, ready for [`crate::huffman::build_tree`].
    pub fn into_leaves(self) -> impl Iterator<Item = TreeNode<T>> {
        self.counts
            .into_iter()
            .map(|(element, frequency)| TreeNode::leaf(element, frequency))
    }
}
