//! A bit granular writer layered over any byte sink.

use crate::io::{Result, Write};

/// An interface for writing an arbitrary number of bits into a byte sink.
///
/// Bits are collected *most significant first* into a single byte buffer. As soon
/// as eight bits are collected the byte is handed to the sink. A partially filled
/// byte is only emitted by [`BitWriter::align`] or [`BitWriter::flush`], which pad
/// it with zero bits.
///
/// Dropping the writer pads and emits any partial byte, but errors are swallowed
/// there, so callers that care should call [`BitWriter::flush`] themselves.
pub struct BitWriter<W: Write> {
    sink: W,
    /// The byte that is currently being filled
    partial: u8,
    /// How many bits of `partial` are already occupied
    bits_in_partial: u8,
    /// Number of whole bytes handed to the sink so far
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Initialize a new writer on top of `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            partial: 0,
            bits_in_partial: 0,
            bytes_written: 0,
        }
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        if bit {
            self.partial |= 0x80 >> self.bits_in_partial;
        }
        self.bits_in_partial += 1;
        if self.bits_in_partial == 8 {
            self.emit_partial()?;
        }
        Ok(())
    }

    /// Write the lowest `num_bits` bits of `value`, starting with the most significant
    /// of them.
    ///
    /// # Panics
    /// If `num_bits` is bigger than 64.
    pub fn write_bits(&mut self, value: u64, num_bits: u8) -> Result<()> {
        assert!(num_bits <= 64, "Can't write more than 64 bits at once");
        let mut remaining = num_bits;

        // Fill up the current byte bit by bit until it is aligned
        while remaining > 0 && self.bits_in_partial != 0 {
            remaining -= 1;
            self.write_bit((value >> remaining) & 1 == 1)?;
        }
        // Whole bytes can go to the sink directly
        while remaining >= 8 {
            remaining -= 8;
            let byte = (value >> remaining) as u8;
            self.sink.write_all(&[byte])?;
            self.bytes_written += 1;
        }
        while remaining > 0 {
            remaining -= 1;
            self.write_bit((value >> remaining) & 1 == 1)?;
        }
        Ok(())
    }

    /// Pad the current byte with zero bits and emit it. Does nothing if the writer
    /// already sits on a byte boundary.
    pub fn align(&mut self) -> Result<()> {
        if self.bits_in_partial != 0 {
            self.emit_partial()?;
        }
        Ok(())
    }

    /// Align to the next byte boundary and flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.align()?;
        self.sink.flush()
    }

    pub fn is_aligned(&self) -> bool {
        self.bits_in_partial == 0
    }

    /// Total number of bits written so far, including the ones still waiting in the
    /// partial byte.
    pub fn bits_written(&self) -> u64 {
        self.bytes_written * 8 + u64::from(self.bits_in_partial)
    }

    fn emit_partial(&mut self) -> Result<()> {
        let byte = self.partial;
        self.partial = 0;
        self.bits_in_partial = 0;
        self.sink.write_all(&[byte])?;
        self.bytes_written += 1;
        Ok(())
    }
}

impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::BitWriter;
    use crate::io::{Error, ErrorKind, Write};

    #[test]
    fn single_byte_written_4_4() {
        // Write the first 4 bits as 1s and the last 4 bits as 0s
        // 1010 is used where values should never be read from.
        let mut output = Vec::new();
        let mut bw = BitWriter::new(&mut output);
        bw.write_bits(0b1010_1111, 4).unwrap();
        bw.write_bits(0b1010_0000, 4).unwrap();
        assert!(bw.is_aligned());
        drop(bw);
        assert_eq!(vec![0b1111_0000], output, "4 bits and 4 bits written into buffer");
    }

    #[test]
    fn single_bits_msb_first() {
        let mut output = Vec::new();
        let mut bw = BitWriter::new(&mut output);
        for bit in [true, false, true, true, false, false, false, true] {
            bw.write_bit(bit).unwrap();
        }
        assert_eq!(bw.bits_written(), 8);
        drop(bw);
        assert_eq!(vec![0b1011_0001], output);
    }

    #[test]
    fn byte_is_emitted_after_eighth_bit() {
        let mut output = Vec::new();
        {
            let mut bw = BitWriter::new(&mut output);
            for _ in 0..7 {
                bw.write_bit(true).unwrap();
            }
            bw.write_bit(true).unwrap();
            // partial byte is empty again, the drop must not emit anything
        }
        assert_eq!(vec![0xFF], output);
    }

    #[test]
    fn multi_byte_boundary_crossed_4_5_7() {
        // Writing 4 1s and then 5 zeros then 7 1s
        let mut output = Vec::new();
        let mut bw = BitWriter::new(&mut output);
        bw.write_bits(0b0000_1111, 4).unwrap();
        bw.write_bits(0b1010_0000, 5).unwrap();
        bw.write_bits(0b0111_1111, 7).unwrap();
        drop(bw);
        assert_eq!(vec![0b1111_0000, 0b0111_1111], output);
    }

    #[test]
    fn wide_value_unaligned() {
        let mut output = Vec::new();
        let mut bw = BitWriter::new(&mut output);
        bw.write_bit(true).unwrap();
        bw.write_bits(0xDEAD_BEEF, 32).unwrap();
        bw.flush().unwrap();
        drop(bw);
        // 1 followed by 0xDEADBEEF, shifted right by one and padded with 7 zeros
        assert_eq!(vec![0xEF, 0x56, 0xDF, 0x77, 0x80], output);
    }

    #[test]
    fn wide_value_aligned() {
        let mut output = Vec::new();
        let mut bw = BitWriter::new(&mut output);
        bw.write_bits(0x0000_0004, 32).unwrap();
        bw.write_bits(u64::MAX, 64).unwrap();
        drop(bw);
        let mut expected = vec![0, 0, 0, 4];
        expected.extend_from_slice(&[0xFF; 8]);
        assert_eq!(expected, output);
    }

    #[test]
    fn padding_is_zero() {
        let mut output = Vec::new();
        let mut bw = BitWriter::new(&mut output);
        bw.write_bits(0b111, 3).unwrap();
        assert!(!bw.is_aligned());
        bw.align().unwrap();
        assert!(bw.is_aligned());
        // aligning twice must not add another byte
        bw.align().unwrap();
        assert_eq!(bw.bits_written(), 8);
        drop(bw);
        assert_eq!(vec![0b1110_0000], output);
    }

    #[test]
    fn write_error_is_propagated() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(Error::new(ErrorKind::Other, "broken sink"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let mut bw = BitWriter::new(Broken);
        bw.write_bits(0x7F, 7).unwrap();
        let err = bw.write_bit(true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
