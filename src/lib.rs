//! A two pass Huffman packer.
//!
//! The first pass over a source counts how often every element occurs, the
//! counts are turned into a Huffman tree and the tree is written in front of
//! the encoded body. The second pass re-reads the source and writes the
//! codeword of every element.
//!
//! What an "element" is depends on the [`converter::ElementConverter`] in
//! use: [`converter::ByteConverter`] packs raw bytes,
//! [`converter::CharacterConverter`] packs UTF-8 decoded `char`s.
//!
//! ```
//! use rupack::converter::ByteConverter;
//! use std::io::Cursor;
//!
//! let mut packed = Vec::new();
//! let summary = rupack::pack(&ByteConverter, &mut Cursor::new(b"aaab"), &mut packed).unwrap();
//!
//! let mut unpacked = Vec::new();
//! let digest = rupack::unpack(&ByteConverter, packed.as_slice(), &mut unpacked).unwrap();
//! assert_eq!(unpacked, b"aaab");
//! assert_eq!(digest, summary.digest);
//! ```
#![deny(trivial_casts, trivial_numeric_casts, rust_2018_idioms)]

pub mod converter;
pub mod decoding;
pub mod digest;
pub mod encoding;
pub mod format;
pub mod huffman;
pub mod io;
mod tests;

pub use decoding::unpacker::{unpack, unpack_digest, UnpackError};
pub use digest::ContentDigest;
pub use encoding::packer::{pack, pack_to_vec, PackError, PackSummary};
pub use format::{ConverterType, FormatError};
