//! The unpack side: rebuild the tree and walk it once per element.

use super::bit_reader::{BitReader, GetBitsError};
use crate::converter::ElementConverter;
use crate::digest::{ContentDigest, DigestWriter};
use crate::encoding::packer::COUNT_BITS;
use crate::format::FormatError;
use crate::huffman::{read_tree, ReadTreeError, TreeNode};
use crate::io::{self, Error, ErrorKind, Read, Write};
use tracing::debug;

const COUNT_BYTES: usize = COUNT_BITS as usize / 8;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UnpackError {
    #[error(transparent)]
    Io(#[from] Error),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    ReadTreeError(#[from] ReadTreeError),
    #[error("Non zero padding 0b{bits:b} after the tree")]
    TreePadding { bits: u8 },
    #[error("Error while reading the element count: {0}")]
    CountReadError(#[source] GetBitsError),
    #[error("Element count is negative: {got}")]
    NegativeCount { got: i32 },
    #[error("Stream has no tree but claims to hold {count} elements")]
    MissingTree { count: u32 },
    #[error("Stream ended after {decoded} of {expected} elements")]
    TruncatedBody {
        decoded: u32,
        expected: u32,
        #[source]
        source: GetBitsError,
    },
    #[error("Non zero padding 0b{bits:b} at the end of the body")]
    BodyPadding { bits: u8 },
    #[error("Data left over after the last element")]
    TrailingData,
}

/// Unpack a stream produced by [`crate::pack`], writing every decoded element to
/// `destination`. Returns the digest of the decoded content.
///
/// The packed stream is pulled from `source` one byte at a time as the bit walk
/// needs it. Any inconsistency (truncation, non zero padding, trailing data)
/// fails the whole call, `destination` may have received part of the output by
/// then.
pub fn unpack<C, R, W>(converter: &C, mut source: R, destination: W) -> Result<ContentDigest, UnpackError>
where
    C: ElementConverter,
    R: Read,
    W: Write,
{
    let mut output = DigestWriter::new(io::BufWriter::new(destination));

    // Any stream with a tree holds at least one tree byte on top of the count, an
    // empty source is stored as nothing but the count.
    let mut head = [0u8; COUNT_BYTES + 1];
    let head_len = read_head(&mut source, &mut head)?;
    if head_len == COUNT_BYTES {
        let count = read_count(&mut BitReader::new(&head[..head_len]))?;
        if count != 0 {
            return Err(UnpackError::MissingTree { count });
        }
        output.flush()?;
        return Ok(output.digest());
    }

    let mut reader = BitReader::new(Read::chain(&head[..head_len], source));
    let root = read_tree(converter, &mut reader)?;
    let padding = reader.align();
    if padding != 0 {
        return Err(UnpackError::TreePadding { bits: padding });
    }
    let count = read_count(&mut reader)?;
    debug!(
        count,
        distinct = root.leaf_count(),
        height = root.height(),
        "read tree"
    );

    for decoded in 0..count {
        let element = match next_element(&root, &mut reader) {
            Ok(element) => element,
            Err(GetBitsError::Io(e)) => return Err(UnpackError::Io(e)),
            Err(source) => {
                return Err(UnpackError::TruncatedBody {
                    decoded,
                    expected: count,
                    source,
                })
            }
        };
        converter.write_element(&mut output, element)?;
    }

    let padding = reader.align();
    if padding != 0 {
        return Err(UnpackError::BodyPadding { bits: padding });
    }
    output.flush()?;
    if !reader.at_end()? {
        return Err(UnpackError::TrailingData);
    }
    Ok(output.digest())
}

/// Unpack only to compute the digest of the original content.
pub fn unpack_digest<C: ElementConverter, R: Read>(
    converter: &C,
    source: R,
) -> Result<ContentDigest, UnpackError> {
    unpack(converter, source, io::sink())
}

/// Fill as much of `head` as the source has, returning how much that was.
fn read_head<R: Read>(source: &mut R, head: &mut [u8]) -> Result<usize, Error> {
    let mut filled = 0;
    while filled < head.len() {
        match source.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_count<R: Read>(reader: &mut BitReader<R>) -> Result<u32, UnpackError> {
    let raw = reader
        .get_bits(usize::from(COUNT_BITS))
        .map_err(UnpackError::CountReadError)?;
    let count = raw as u32 as i32;
    if count < 0 {
        return Err(UnpackError::NegativeCount { got: count });
    }
    Ok(count as u32)
}

/// Walk from the root to a leaf, 0 going left and 1 going right.
///
/// A root that is itself a leaf is the single element case: its codeword is empty
/// and no bits are read.
fn next_element<T: Copy, R: Read>(root: &TreeNode<T>, reader: &mut BitReader<R>) -> Result<T, GetBitsError> {
    let mut node = root;
    loop {
        match node {
            TreeNode::Leaf { element, .. } => return Ok(*element),
            TreeNode::Internal { left, right, .. } => {
                node = if reader.get_bit()? { &**right } else { &**left };
            }
        }
    }
}
