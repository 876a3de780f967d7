//! Content digests used to check that unpacking reproduced the original content.

use crate::io::{self, Write};
use core::fmt;
use md5::{Digest, Md5};

/// Length of a [`ContentDigest`] in bytes
pub const DIGEST_LEN: usize = 16;

/// MD5 over the raw encoding of every element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest(pub [u8; DIGEST_LEN]);

impl ContentDigest {
    /// Digest of a byte slice in one go.
    pub fn of(bytes: &[u8]) -> Self {
        Self::from_hasher(Md5::new_with_prefix(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    fn from_hasher(hasher: Md5) -> Self {
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&hasher.finalize());
        ContentDigest(out)
    }
}

/// Lowercase hex, two digits per byte
impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Forwards everything to the inner writer while folding it into a digest.
///
/// Use [`crate::io::sink`] as the inner writer to only compute the digest.
pub struct DigestWriter<W: Write> {
    inner: W,
    hasher: Md5,
}

impl<W: Write> DigestWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Md5::new(),
        }
    }

    /// Digest of everything written so far.
    pub fn digest(&self) -> ContentDigest {
        ContentDigest::from_hasher(self.hasher.clone())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
