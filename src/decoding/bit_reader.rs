//! Reads bits most significant first from a byte source.

use crate::io::{self, ErrorKind, Read};

/// Reads bits from a packed stream, most significant bit of every byte first.
///
/// Bytes are pulled from the source one at a time, the next one only when a bit
/// from it is requested.
pub struct BitReader<R: Read> {
    source: R,
    current: u8,
    bits_in_current: u8,
    bits_read: u64,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GetBitsError {
    #[error("Cant serve this request. The reader is limited to {limit} bits, requested {num_requested_bits} bits")]
    TooManyBits {
        num_requested_bits: usize,
        limit: u8,
    },
    #[error("Source ended after {got} of {requested} requested bits")]
    EndOfStream { requested: usize, got: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl<R: Read> BitReader<R> {
    pub fn new(source: R) -> BitReader<R> {
        BitReader {
            source,
            current: 0,
            bits_in_current: 0,
            bits_read: 0,
        }
    }

    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    pub fn is_aligned(&self) -> bool {
        self.bits_in_current == 0
    }

    /// Read one bit, `true` for a 1.
    pub fn get_bit(&mut self) -> Result<bool, GetBitsError> {
        if self.bits_in_current == 0 {
            match self.next_byte()? {
                Some(byte) => {
                    self.current = byte;
                    self.bits_in_current = 8;
                }
                None => {
                    return Err(GetBitsError::EndOfStream {
                        requested: 1,
                        got: 0,
                    })
                }
            }
        }
        self.bits_in_current -= 1;
        self.bits_read += 1;
        Ok(self.current & (1 << self.bits_in_current) != 0)
    }

    /// Read `n` bits and return them in the lower bits of a `u64`, the first bit read
    /// ending up as the most significant one.
    pub fn get_bits(&mut self, n: usize) -> Result<u64, GetBitsError> {
        if n > 64 {
            return Err(GetBitsError::TooManyBits {
                num_requested_bits: n,
                limit: 64,
            });
        }
        let mut value = 0u64;
        for got in 0..n {
            let bit = match self.get_bit() {
                Ok(bit) => bit,
                Err(GetBitsError::EndOfStream { .. }) => {
                    return Err(GetBitsError::EndOfStream { requested: n, got })
                }
                Err(e) => return Err(e),
            };
            value = (value << 1) | u64::from(bit);
        }
        Ok(value)
    }

    /// Skip to the next byte boundary, returning the skipped bits in the lower bits of
    /// a `u8` so the caller can check the padding.
    pub fn align(&mut self) -> u8 {
        let skipped = self.current & ((1u16 << self.bits_in_current) - 1) as u8;
        self.bits_read += u64::from(self.bits_in_current);
        self.bits_in_current = 0;
        skipped
    }

    /// Whether the source ends right here. Only meaningful on a byte boundary; a
    /// byte that is found is consumed.
    pub fn at_end(&mut self) -> io::Result<bool> {
        debug_assert!(self.is_aligned());
        Ok(self.next_byte()?.is_none())
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.source.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
