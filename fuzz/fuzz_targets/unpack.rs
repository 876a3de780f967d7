#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate rupack;
use rupack::format::unpack_file;
use std::io::{self, Write};

/// Gives up after a few MiB, a tiny stream can claim up to i32::MAX elements.
struct Bounded(usize);

impl Write for Bounded {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() > self.0 {
            return Err(io::Error::new(io::ErrorKind::Other, "output limit reached"));
        }
        self.0 -= buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    _ = unpack_file(data, Bounded(4 << 20));
});
