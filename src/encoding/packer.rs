//! The pack side: two passes over a rewindable source.

use super::bit_writer::BitWriter;
use super::frequency::FrequencyTable;
use crate::converter::ElementConverter;
use crate::digest::{ContentDigest, DigestWriter};
use crate::huffman::{build_tree, write_tree, WriteTreeError};
use crate::io::{self, BufReader, Error, Read, Seek, SeekFrom, Write};
use core::convert::TryFrom;
use core::fmt::Debug;
use tracing::{debug, info};

/// Width of the element count that follows the tree
pub(crate) const COUNT_BITS: u8 = 32;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PackError {
    #[error(transparent)]
    Io(#[from] Error),
    #[error(transparent)]
    WriteTreeError(#[from] WriteTreeError),
    #[error("Source has {got} elements, at most {} can be packed", i32::MAX)]
    TooManyElements { got: u64 },
    #[error("Element {element} was not seen while counting. Did the source change between passes?")]
    UnknownElement { element: String },
    #[error("Source had {counted} elements while counting but {encoded} while encoding. Did the source change between passes?")]
    ElementCountChanged { counted: u64, encoded: u64 },
}

/// What [`pack`] reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSummary {
    /// Digest of the original content, not of the packed bytes
    pub digest: ContentDigest,
    pub total_elements: u64,
    pub distinct_elements: usize,
    /// Length of the encoded body in bits, without padding
    pub body_bits: u64,
}

impl PackSummary {
    /// `None` for an empty source.
    pub fn average_bits_per_element(&self) -> Option<f64> {
        if self.total_elements == 0 {
            None
        } else {
            Some(self.body_bits as f64 / self.total_elements as f64)
        }
    }
}

/// Pack `source` into `sink`.
///
/// The source is read twice: once to count the elements and once more, after
/// seeking back to the start, to encode them. The layout written to `sink` is
///
/// ```text
/// tree     pre-order, 1 bit per node, leaves followed by their payload
/// padding  zero bits up to the next byte boundary
/// count    number of elements, 32 bit big endian
/// body     one codeword per element, zero padded to a byte boundary
/// ```
///
/// An empty source has no tree, so only the count (0) is written.
pub fn pack<C, R, W>(converter: &C, source: &mut R, sink: &mut W) -> Result<PackSummary, PackError>
where
    C: ElementConverter,
    R: Read + Seek,
    W: Write,
{
    source.seek(SeekFrom::Start(0))?;
    let counts = FrequencyTable::try_count(converter.elements(BufReader::new(&mut *source)))?;
    let total_elements = counts.total();
    let distinct_elements = counts.len();
    let count = i32::try_from(total_elements).map_err(|_| PackError::TooManyElements {
        got: total_elements,
    })?;
    info!(total_elements, distinct_elements, "counted source");

    let mut writer = BitWriter::new(sink);
    let tree = build_tree(counts.into_leaves(), |a, b| converter.compare(a, b));
    let table = match tree {
        Some(root) => {
            let table = write_tree(&root, converter, &mut writer)?;
            debug!(tree_bits = writer.bits_written(), "wrote tree");
            writer.align()?;
            Some(table)
        }
        None => None,
    };
    writer.write_bits(u64::from(count as u32), COUNT_BITS)?;

    source.seek(SeekFrom::Start(0))?;
    let body_start = writer.bits_written();
    let mut digest = DigestWriter::new(io::sink());
    let mut encoded = 0u64;
    for element in converter.elements(BufReader::new(&mut *source)) {
        let element = element?;
        let code = table
            .as_ref()
            .and_then(|table| table.get(&element))
            .ok_or_else(|| unknown_element(&element))?;
        writer.write_bits(code.bits(), code.len())?;
        converter.write_element(&mut digest, element)?;
        encoded += 1;
    }
    if encoded != total_elements {
        return Err(PackError::ElementCountChanged {
            counted: total_elements,
            encoded,
        });
    }
    let body_bits = writer.bits_written() - body_start;
    writer.flush()?;

    let summary = PackSummary {
        digest: digest.digest(),
        total_elements,
        distinct_elements,
        body_bits,
    };
    debug!(
        body_bits,
        average_bits = summary.average_bits_per_element().unwrap_or(f64::NAN),
        "packed"
    );
    Ok(summary)
}

/// Pack an in memory source, returning the packed bytes alongside the summary.
pub fn pack_to_vec<C: ElementConverter>(
    converter: &C,
    source: &[u8],
) -> Result<(Vec<u8>, PackSummary), PackError> {
    let mut packed = Vec::new();
    let summary = pack(converter, &mut io::Cursor::new(source), &mut packed)?;
    Ok((packed, summary))
}

fn unknown_element<T: Debug>(element: &T) -> PackError {
    PackError::UnknownElement {
        element: format!("{:?}", element),
    }
}
