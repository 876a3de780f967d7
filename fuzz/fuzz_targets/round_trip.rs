#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate rupack;
use rupack::format::{pack_file, unpack_file, ConverterType};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let converter_type = ConverterType::probe(data);
    let mut packed = Vec::new();
    let summary = pack_file(converter_type, &mut Cursor::new(data), &mut packed).unwrap();

    let mut unpacked = Vec::with_capacity(data.len());
    let (detected, digest) = unpack_file(packed.as_slice(), &mut unpacked).unwrap();
    assert_eq!(detected, converter_type);
    assert_eq!(digest, summary.digest);
    assert_eq!(data, &unpacked[..]);
});
