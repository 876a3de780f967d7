use super::{read_byte, DecodeElementError, ElementConverter};
use crate::decoding::bit_reader::BitReader;
use crate::encoding::bit_writer::BitWriter;
use crate::io::{self, ErrorKind, Read, Write};
use core::cmp::Ordering;
use core::convert::TryFrom;

/// Decodes the source as UTF-8 and treats every `char` as one element.
///
/// Leaves store the scalar value as 32 bits. Malformed UTF-8 in the source is
/// reported as an [`ErrorKind::InvalidData`] error instead of being replaced, since
/// a replacement character would break the round trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterConverter;

const LEAF_BITS: u8 = 32;

/// Length of a UTF-8 sequence judging by its first byte
fn sequence_len(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

impl ElementConverter for CharacterConverter {
    type Element = char;

    fn compare(&self, a: &char, b: &char) -> Ordering {
        a.cmp(b)
    }

    fn read_element<R: Read>(&self, source: &mut R) -> io::Result<Option<char>> {
        let first = match read_byte(source)? {
            Some(byte) => byte,
            None => return Ok(None),
        };
        let len = sequence_len(first).ok_or_else(|| {
            io::Error::new(
                ErrorKind::InvalidData,
                format!("0x{:02X} can't start a UTF-8 sequence", first),
            )
        })?;

        let mut buf = [first, 0, 0, 0];
        source.read_exact(&mut buf[1..len])?;
        let decoded = core::str::from_utf8(&buf[..len])
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
        Ok(decoded.chars().next())
    }

    fn write_element<W: Write>(&self, sink: &mut W, element: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        sink.write_all(element.encode_utf8(&mut buf).as_bytes())
    }

    fn write_leaf<W: Write>(&self, writer: &mut BitWriter<W>, element: char) -> io::Result<()> {
        writer.write_bits(u64::from(u32::from(element)), LEAF_BITS)
    }

    fn read_leaf<R: Read>(&self, reader: &mut BitReader<R>) -> Result<char, DecodeElementError> {
        let bits = reader.get_bits(usize::from(LEAF_BITS))?;
        // get_bits only hands out LEAF_BITS bits, so this always fits a u32
        char::try_from(bits as u32).map_err(|_| DecodeElementError::InvalidElement { bits })
    }
}

#[cfg(test)]
mod tests {
    use super::CharacterConverter;
    use crate::converter::{DecodeElementError, ElementConverter};
    use crate::decoding::bit_reader::BitReader;
    use crate::encoding::bit_writer::BitWriter;
    use crate::io::ErrorKind;

    fn decode(source: &[u8]) -> std::io::Result<Vec<char>> {
        CharacterConverter.elements(source).collect()
    }

    #[test]
    fn decodes_multibyte_sequences() {
        let text = "aß€😀";
        assert_eq!(decode(text.as_bytes()).unwrap(), text.chars().collect::<Vec<_>>());
    }

    #[test]
    fn write_element_is_utf8() {
        let mut out = Vec::new();
        for ch in "grüße 😀".chars() {
            CharacterConverter.write_element(&mut out, ch).unwrap();
        }
        assert_eq!(out, "grüße 😀".as_bytes());
    }

    #[test]
    fn rejects_invalid_start_byte() {
        let err = decode(&[b'a', 0xFF]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn rejects_bad_continuation() {
        let err = decode(&[0xC3, b'a']).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn rejects_truncated_sequence() {
        let err = decode(&[0xE2, 0x82]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn leaf_round_trip() {
        let mut out = Vec::new();
        let mut bw = BitWriter::new(&mut out);
        bw.write_bit(false).unwrap();
        CharacterConverter.write_leaf(&mut bw, '€').unwrap();
        drop(bw);
        assert_eq!(out.len(), 5);

        let mut br = BitReader::new(out.as_slice());
        assert!(!br.get_bit().unwrap());
        assert_eq!(CharacterConverter.read_leaf(&mut br).unwrap(), '€');
    }

    #[test]
    fn surrogate_leaf_is_invalid() {
        let bytes = 0xD800u32.to_be_bytes();
        let mut br = BitReader::new(&bytes[..]);
        assert!(matches!(
            CharacterConverter.read_leaf(&mut br),
            Err(DecodeElementError::InvalidElement { bits: 0xD800 })
        ));
    }
}
