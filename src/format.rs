//! Packed files start with one byte naming the converter that packed them.

use crate::converter::{ByteConverter, CharacterConverter};
use crate::decoding::unpacker::{unpack, UnpackError};
use crate::digest::ContentDigest;
use crate::encoding::packer::{pack, PackError, PackSummary};
use crate::io::{Error, ErrorKind, Read, Seek, Write};
use core::fmt;
use tracing::debug;

/// Which converter a packed file was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConverterType {
    /// UTF-8 text, packed one `char` at a time
    Character,
    /// Anything else, packed one byte at a time
    Byte,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FormatError {
    #[error("Error while reading the format discriminator: {0}")]
    DiscriminatorReadError(#[source] Error),
    #[error("Packed stream is empty, expected a format discriminator")]
    MissingDiscriminator,
    #[error("Unknown format discriminator: 0x{got:02X}")]
    UnknownDiscriminator { got: u8 },
}

impl ConverterType {
    pub const fn signifier(self) -> u8 {
        match self {
            ConverterType::Character => 0x01,
            ConverterType::Byte => 0x02,
        }
    }

    pub fn from_signifier(signifier: u8) -> Result<Self, FormatError> {
        match signifier {
            0x01 => Ok(ConverterType::Character),
            0x02 => Ok(ConverterType::Byte),
            got => Err(FormatError::UnknownDiscriminator { got }),
        }
    }

    /// Guess the converter from the content: text if it is non empty, valid UTF-8.
    pub fn probe(content: &[u8]) -> Self {
        if !content.is_empty() && core::str::from_utf8(content).is_ok() {
            ConverterType::Character
        } else {
            ConverterType::Byte
        }
    }
}

impl fmt::Display for ConverterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConverterType::Character => write!(f, "character"),
            ConverterType::Byte => write!(f, "byte"),
        }
    }
}

/// Write the discriminator of `converter_type`, then pack `source` with that
/// converter.
pub fn pack_file<R, W>(
    converter_type: ConverterType,
    source: &mut R,
    sink: &mut W,
) -> Result<PackSummary, PackError>
where
    R: Read + Seek,
    W: Write,
{
    debug!(%converter_type, "packing");
    sink.write_all(&[converter_type.signifier()])?;
    match converter_type {
        ConverterType::Character => pack(&CharacterConverter, source, sink),
        ConverterType::Byte => pack(&ByteConverter, source, sink),
    }
}

/// Read the discriminator and unpack the rest of `source` with the converter it
/// names. Unknown discriminators are rejected before anything else is read.
pub fn unpack_file<R, W>(
    mut source: R,
    destination: W,
) -> Result<(ConverterType, ContentDigest), UnpackError>
where
    R: Read,
    W: Write,
{
    let converter_type = read_discriminator(&mut source)?;
    debug!(%converter_type, "unpacking");
    let digest = match converter_type {
        ConverterType::Character => unpack(&CharacterConverter, source, destination)?,
        ConverterType::Byte => unpack(&ByteConverter, source, destination)?,
    };
    Ok((converter_type, digest))
}

fn read_discriminator<R: Read>(source: &mut R) -> Result<ConverterType, FormatError> {
    let mut signifier = [0u8; 1];
    match source.read_exact(&mut signifier) {
        Ok(()) => ConverterType::from_signifier(signifier[0]),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(FormatError::MissingDiscriminator),
        Err(e) => Err(FormatError::DiscriminatorReadError(e)),
    }
}
