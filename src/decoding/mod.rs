//! Structures and utilities used for unpacking packed data

pub mod bit_reader;
pub mod unpacker;
