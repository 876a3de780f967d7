//! Element converters decide what a single "element" of a source is.
//!
//! The packer itself is generic over the element type. A converter knows how to
//! pull elements out of a byte source, how to write them back out, how to store
//! them as fixed width leaf payloads inside the serialized tree, and how to order
//! them so equal frequencies can be broken deterministically.

use crate::decoding::bit_reader::{BitReader, GetBitsError};
use crate::encoding::bit_writer::BitWriter;
use crate::io::{self, ErrorKind, Read, Write};
use core::cmp::Ordering;
use core::fmt::Debug;
use core::hash::Hash;

mod byte;
mod character;
pub use byte::ByteConverter;
pub use character::CharacterConverter;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeElementError {
    #[error(transparent)]
    GetBitsError(#[from] GetBitsError),
    #[error("Leaf payload 0x{bits:X} is not a valid element")]
    InvalidElement { bits: u64 },
}

pub trait ElementConverter {
    type Element: Copy + Eq + Hash + Debug;

    /// Total order used to break ties between tree nodes of equal frequency.
    fn compare(&self, a: &Self::Element, b: &Self::Element) -> Ordering;

    /// Pull the next element out of `source`. Returns `Ok(None)` once the source is
    /// cleanly exhausted.
    fn read_element<R: Read>(&self, source: &mut R) -> io::Result<Option<Self::Element>>;

    /// Write the raw encoding of `element`. This is what ends up in an unpacked file
    /// and what gets folded into the content digest.
    fn write_element<W: Write>(&self, sink: &mut W, element: Self::Element) -> io::Result<()>;

    /// Write `element` as a fixed width tree leaf payload.
    fn write_leaf<W: Write>(
        &self,
        writer: &mut BitWriter<W>,
        element: Self::Element,
    ) -> io::Result<()>;

    /// Read back a leaf payload written by [`ElementConverter::write_leaf`].
    fn read_leaf<R: Read>(&self, reader: &mut BitReader<R>) -> Result<Self::Element, DecodeElementError>;

    /// A lazy sequence over all elements of `source`.
    ///
    /// Every call starts a fresh pass, so a source that can be rewound can be walked
    /// as often as needed.
    fn elements<R: Read>(&self, source: R) -> Elements<'_, Self, R>
    where
        Self: Sized,
    {
        Elements {
            converter: self,
            source,
        }
    }
}

/// Iterator returned by [`ElementConverter::elements`].
pub struct Elements<'c, C, R> {
    converter: &'c C,
    source: R,
}

impl<'c, C: ElementConverter, R: Read> Iterator for Elements<'c, C, R> {
    type Item = io::Result<C::Element>;

    fn next(&mut self) -> Option<Self::Item> {
        self.converter.read_element(&mut self.source).transpose()
    }
}

/// Read a single byte, `None` if the source is exhausted.
pub(crate) fn read_byte<R: Read>(source: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match source.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
