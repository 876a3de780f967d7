//! Re-exports of the std io items the packer works with.
pub use std::io::{sink, BufReader, BufWriter, Cursor, Error, ErrorKind, Read, Result, Seek, SeekFrom, Sink, Write};
