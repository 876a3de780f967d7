//! Modules used for packing data.
pub mod bit_writer;
pub mod frequency;
pub mod packer;
