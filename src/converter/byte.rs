use super::{read_byte, DecodeElementError, ElementConverter};
use crate::decoding::bit_reader::BitReader;
use crate::encoding::bit_writer::BitWriter;
use crate::io::{self, Read, Write};
use core::cmp::Ordering;

/// Treats every byte of the source as one element.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteConverter;

impl ElementConverter for ByteConverter {
    type Element = u8;

    fn compare(&self, a: &u8, b: &u8) -> Ordering {
        a.cmp(b)
    }

    fn read_element<R: Read>(&self, source: &mut R) -> io::Result<Option<u8>> {
        read_byte(source)
    }

    fn write_element<W: Write>(&self, sink: &mut W, element: u8) -> io::Result<()> {
        sink.write_all(&[element])
    }

    fn write_leaf<W: Write>(&self, writer: &mut BitWriter<W>, element: u8) -> io::Result<()> {
        writer.write_bits(u64::from(element), 8)
    }

    fn read_leaf<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u8, DecodeElementError> {
        Ok(reader.get_bits(8)? as u8)
    }
}
