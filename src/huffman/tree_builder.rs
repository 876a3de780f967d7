use super::TreeNode;
use core::cmp::Ordering;
use tracing::debug;

/// A node waiting to be merged, together with its sort key.
struct HeapEntry<T> {
    frequency: u64,
    /// Leftmost element of `node`, cached so comparisons don't walk the tree
    key: T,
    node: TreeNode<T>,
}

/// Binary min-heap over tree nodes, ordered by ascending frequency first and by
/// the leftmost element of each node second.
///
/// Two distinct nodes never share a leftmost element (their leaf sets are
/// disjoint), so as long as `compare` is a total order no two entries compare
/// equal and the extraction order only depends on the element values.
struct NodeHeap<T, F> {
    entries: Vec<HeapEntry<T>>,
    compare: F,
}

impl<T: Copy, F: Fn(&T, &T) -> Ordering> NodeHeap<T, F> {
    fn new(compare: F) -> Self {
        NodeHeap {
            entries: Vec::new(),
            compare,
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn less(&self, a: usize, b: usize) -> bool {
        let a = &self.entries[a];
        let b = &self.entries[b];
        let order = a
            .frequency
            .cmp(&b.frequency)
            .then_with(|| (self.compare)(&a.key, &b.key));
        order == Ordering::Less
    }

    fn push(&mut self, node: TreeNode<T>) {
        let entry = HeapEntry {
            frequency: node.frequency(),
            key: *node.leftmost_element(),
            node,
        };
        self.entries.push(entry);
        self.sift_up(self.entries.len() - 1);
    }

    fn pop(&mut self) -> Option<TreeNode<T>> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let min = self.entries.pop().map(|entry| entry.node);
        self.sift_down(0);
        min
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !self.less(idx, parent) {
                break;
            }
            self.entries.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut smallest = idx;
            if left < self.entries.len() && self.less(left, smallest) {
                smallest = left;
            }
            if right < self.entries.len() && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == idx {
                return;
            }
            self.entries.swap(idx, smallest);
            idx = smallest;
        }
    }
}

/// Build a Huffman tree out of one leaf per distinct element.
///
/// The two lowest ordered nodes are repeatedly taken out and merged, the first one
/// becoming the left child, until a single root remains. Ties in frequency are
/// broken by comparing the leftmost elements of the nodes with `compare`, which
/// makes the resulting tree independent of the order the leaves are passed in.
///
/// Returns `None` if there are no leaves. A single leaf is returned as is.
pub fn build_tree<T, I, F>(leaves: I, compare: F) -> Option<TreeNode<T>>
where
    T: Copy,
    I: IntoIterator<Item = TreeNode<T>>,
    F: Fn(&T, &T) -> Ordering,
{
    let mut heap = NodeHeap::new(compare);
    for leaf in leaves {
        heap.push(leaf);
    }
    let distinct = heap.len();

    while heap.len() > 1 {
        let first = heap.pop()?;
        let second = heap.pop()?;
        heap.push(TreeNode::merge(first, second));
    }

    let root = heap.pop()?;
    debug!(
        distinct,
        height = root.height(),
        total = root.frequency(),
        "built huffman tree"
    );
    Some(root)
}
