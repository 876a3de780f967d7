use crate::converter::{ByteConverter, CharacterConverter};
use crate::digest::ContentDigest;
use crate::format::{pack_file, unpack_file, ConverterType};
use crate::io::Cursor;
use crate::{pack_to_vec, unpack, unpack_digest, UnpackError};

#[test]
fn aaab() {
    let (packed, summary) = pack_to_vec(&CharacterConverter, b"aaab").unwrap();
    // root(b, a), leaves carry 32 bit scalar values
    // 1 | 0 0x00000062 | 0 0x00000061 | padding
    assert_eq!(
        &packed[..9],
        &[0x80, 0x00, 0x00, 0x18, 0x80, 0x00, 0x00, 0x0C, 0x20]
    );
    assert_eq!(&packed[9..13], &[0, 0, 0, 4]);
    assert_eq!(&packed[13..], &[0b1110_0000]);

    let mut out = Vec::new();
    let digest = unpack(&CharacterConverter, packed.as_slice(), &mut out).unwrap();
    assert_eq!(out, b"aaab");
    assert_eq!(digest, summary.digest);
}

#[test]
fn empty_input() {
    for ty in [ConverterType::Character, ConverterType::Byte] {
        let mut packed = Vec::new();
        let summary = pack_file(ty, &mut Cursor::new(Vec::<u8>::new()), &mut packed).unwrap();
        assert_eq!(packed, vec![ty.signifier(), 0, 0, 0, 0]);
        assert_eq!(summary.digest, ContentDigest::of(&[]));

        let mut out = Vec::new();
        let (_, digest) = unpack_file(packed.as_slice(), &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(digest, ContentDigest::of(&[]));
    }
}

#[test]
fn single_repeated_element() {
    for content in [&b"zzzz"[..], b"z"] {
        let (packed, summary) = pack_to_vec(&ByteConverter, content).unwrap();
        assert_eq!(summary.distinct_elements, 1);
        assert_eq!(summary.body_bits, 0);

        let mut out = Vec::new();
        let digest = unpack(&ByteConverter, packed.as_slice(), &mut out).unwrap();
        assert_eq!(out, content);
        assert_eq!(digest, ContentDigest::of(content));
    }
}

#[test]
fn corrupted_stream_never_passes_silently() {
    let content = b"she sells sea shells by the sea shore";
    let (packed, summary) = pack_to_vec(&ByteConverter, content).unwrap();
    // Flip every single bit in turn. Either the unpacker notices, or the digest
    // no longer matches.
    for byte in 0..packed.len() {
        for bit in 0..8 {
            let mut corrupted = packed.clone();
            corrupted[byte] ^= 1 << bit;
            if let Ok(digest) = unpack_digest(&ByteConverter, corrupted.as_slice()) {
                assert_ne!(digest, summary.digest);
            }
        }
    }
}

#[test]
fn truncation_is_always_an_error() {
    let content = "abracadabra, abracadabra";
    let (packed, _) = pack_to_vec(&CharacterConverter, content.as_bytes()).unwrap();
    for len in 0..packed.len() {
        let result = unpack_digest(&CharacterConverter, &packed[..len]);
        assert!(
            matches!(result, Err(UnpackError::ReadTreeError(_))
                | Err(UnpackError::CountReadError(_))
                | Err(UnpackError::TruncatedBody { .. })
                | Err(UnpackError::MissingTree { .. })
                | Err(UnpackError::NegativeCount { .. })
                | Err(UnpackError::TreePadding { .. })),
            "truncating to {} bytes was not detected",
            len
        );
    }
}
