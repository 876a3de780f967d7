//! Serialization of a Huffman tree in front of the packed body.
//!
//! The tree is written pre-order. Every node starts with one bit: `1` for an
//! internal node, which is followed by its left and then its right subtree, and
//! `0` for a leaf, which is followed by the fixed width payload of its element.

use super::{CodeTable, CodeWord, TreeNode, MAX_TREE_DEPTH};
use crate::converter::{DecodeElementError, ElementConverter};
use crate::decoding::bit_reader::{BitReader, GetBitsError};
use crate::encoding::bit_writer::BitWriter;
use crate::io::{Error, Read, Write};
use tracing::trace;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WriteTreeError {
    #[error(transparent)]
    Io(#[from] Error),
    #[error("Tree is deeper than {} levels, codewords would not fit", MAX_TREE_DEPTH)]
    TooDeep,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReadTreeError {
    #[error("Error while reading a node discriminator: {0}")]
    DiscriminatorReadError(#[source] GetBitsError),
    #[error("Error while reading a leaf: {0}")]
    LeafReadError(#[source] DecodeElementError),
    #[error("Tree nests deeper than {} levels. Stream is probably corrupted", MAX_TREE_DEPTH)]
    TooDeep,
}

/// Write `root` and collect the codeword of every leaf on the way.
///
/// A tree consisting of a single leaf gives that leaf the empty codeword. Such a
/// body carries no bits at all, the element count alone says how often the leaf
/// repeats.
pub fn write_tree<C, W>(
    root: &TreeNode<C::Element>,
    converter: &C,
    writer: &mut BitWriter<W>,
) -> Result<CodeTable<C::Element>, WriteTreeError>
where
    C: ElementConverter,
    W: Write,
{
    let mut table = CodeTable::new();
    write_subtree(root, CodeWord::empty(), converter, writer, &mut table)?;
    Ok(table)
}

fn write_subtree<C, W>(
    node: &TreeNode<C::Element>,
    path: CodeWord,
    converter: &C,
    writer: &mut BitWriter<W>,
    table: &mut CodeTable<C::Element>,
) -> Result<(), WriteTreeError>
where
    C: ElementConverter,
    W: Write,
{
    match node {
        TreeNode::Internal { left, right, .. } => {
            if usize::from(path.len()) >= MAX_TREE_DEPTH {
                return Err(WriteTreeError::TooDeep);
            }
            writer.write_bit(true)?;
            write_subtree(left, path.child(false), converter, writer, table)?;
            write_subtree(right, path.child(true), converter, writer, table)?;
        }
        TreeNode::Leaf { element, frequency } => {
            writer.write_bit(false)?;
            converter.write_leaf(writer, *element)?;
            trace!(element = ?element, frequency, code = %path, "leaf");
            table.insert(*element, path);
        }
    }
    Ok(())
}

/// Read a tree written by [`write_tree`]. Leaves come back with a frequency of 0.
pub fn read_tree<C: ElementConverter, R: Read>(
    converter: &C,
    reader: &mut BitReader<R>,
) -> Result<TreeNode<C::Element>, ReadTreeError> {
    read_subtree(converter, reader, 0)
}

fn read_subtree<C: ElementConverter, R: Read>(
    converter: &C,
    reader: &mut BitReader<R>,
    depth: usize,
) -> Result<TreeNode<C::Element>, ReadTreeError> {
    let is_internal = reader
        .get_bit()
        .map_err(ReadTreeError::DiscriminatorReadError)?;
    if is_internal {
        if depth >= MAX_TREE_DEPTH {
            return Err(ReadTreeError::TooDeep);
        }
        let left = read_subtree(converter, reader, depth + 1)?;
        let right = read_subtree(converter, reader, depth + 1)?;
        Ok(TreeNode::merge(left, right))
    } else {
        let element = converter
            .read_leaf(reader)
            .map_err(ReadTreeError::LeafReadError)?;
        Ok(TreeNode::leaf(element, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::{read_tree, write_tree, ReadTreeError};
    use crate::converter::{ByteConverter, CharacterConverter};
    use crate::decoding::bit_reader::BitReader;
    use crate::encoding::bit_writer::BitWriter;
    use crate::huffman::{build_tree, CodeWord, TreeNode, MAX_TREE_DEPTH};

    /// Compare shapes and elements, frequencies are not serialized
    fn same_shape<T: PartialEq>(a: &TreeNode<T>, b: &TreeNode<T>) -> bool {
        match (a, b) {
            (TreeNode::Leaf { element: x, .. }, TreeNode::Leaf { element: y, .. }) => x == y,
            (
                TreeNode::Internal {
                    left: l1,
                    right: r1,
                    ..
                },
                TreeNode::Internal {
                    left: l2,
                    right: r2,
                    ..
                },
            ) => same_shape(l1, l2) && same_shape(r1, r2),
            _ => false,
        }
    }

    #[test]
    fn two_leaf_layout() {
        let root = TreeNode::merge(TreeNode::leaf(b'b', 1), TreeNode::leaf(b'a', 3));
        let mut out = Vec::new();
        let mut bw = BitWriter::new(&mut out);
        let table = write_tree(&root, &ByteConverter, &mut bw).unwrap();
        assert_eq!(bw.bits_written(), 19);
        drop(bw);

        // 1 | 0 'b' | 0 'a', zero padded
        // 1 0 01100010 0 01100001 00000
        assert_eq!(out, vec![0b1001_1000, 0b1000_1100, 0b0010_0000]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&b'b').unwrap().to_string(), "0");
        assert_eq!(table.get(&b'a').unwrap().to_string(), "1");
    }

    #[test]
    fn single_leaf_has_empty_code() {
        let root = TreeNode::leaf('z', 4);
        let mut out = Vec::new();
        let mut bw = BitWriter::new(&mut out);
        let table = write_tree(&root, &CharacterConverter, &mut bw).unwrap();
        drop(bw);
        assert_eq!(table.get(&'z'), Some(&CodeWord::empty()));
        assert_eq!(out, vec![0, 0, 0, 0x3D, 0]);

        let mut br = BitReader::new(out.as_slice());
        let read = read_tree(&CharacterConverter, &mut br).unwrap();
        assert_eq!(read, TreeNode::leaf('z', 0));
    }

    #[test]
    fn round_trip_preserves_shape_and_codes() {
        let counts = [(b'a', 45), (b'b', 13), (b'c', 12), (b'd', 16), (b'e', 9), (b'f', 5)];
        let root = build_tree(
            counts.iter().map(|&(e, f)| TreeNode::leaf(e, f)),
            |a, b| a.cmp(b),
        )
        .unwrap();

        let mut out = Vec::new();
        let mut bw = BitWriter::new(&mut out);
        let table = write_tree(&root, &ByteConverter, &mut bw).unwrap();
        drop(bw);

        let mut br = BitReader::new(out.as_slice());
        let read = read_tree(&ByteConverter, &mut br).unwrap();
        assert!(same_shape(&root, &read));

        // 'a' is by far the most frequent element
        assert_eq!(table.get(&b'a').unwrap().len(), 1);
        for (x, code_x) in table.iter() {
            for (y, code_y) in table.iter() {
                if x != y {
                    assert!(!code_x.is_prefix_of(code_y));
                }
            }
        }
    }

    #[test]
    fn truncated_tree() {
        // Internal node announcing two children, but only one leaf follows
        let data = [0b1001_1000, 0b1000_0000];
        let mut br = BitReader::new(&data[..]);
        assert!(matches!(
            read_tree(&ByteConverter, &mut br),
            Err(ReadTreeError::DiscriminatorReadError(_)) | Err(ReadTreeError::LeafReadError(_))
        ));
    }

    #[test]
    fn endless_internal_nodes_are_rejected() {
        let data = [0xFF; MAX_TREE_DEPTH / 8 + 2];
        let mut br = BitReader::new(&data[..]);
        assert!(matches!(
            read_tree(&ByteConverter, &mut br),
            Err(ReadTreeError::TooDeep)
        ));
    }

    #[test]
    fn invalid_character_leaf() {
        // leaf discriminator followed by 0x00110000, just past the last scalar value
        let data = [0x00, 0x08, 0x80, 0x00, 0x00];
        let mut br = BitReader::new(&data[..]);
        assert!(matches!(
            read_tree(&CharacterConverter, &mut br),
            Err(ReadTreeError::LeafReadError(_))
        ));
    }
}
