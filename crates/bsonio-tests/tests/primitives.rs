//! Properties of the little-endian primitive reads and the byte counter.

use bsonio_tests::Trickle;
use bsonio_wire::{PrimitiveReader, ReadError};
use quickcheck::{QuickCheck, TestResult};

fn compose_le(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | u64::from(b) << (8 * i))
}

#[test]
fn i64_is_little_endian_composition() {
    fn prop(value: i64) -> bool {
        let bytes = value.to_le_bytes();
        let mut reader = PrimitiveReader::new(&bytes[..]);
        let read = reader.read_i64().unwrap();
        read == value && read.to_le_bytes() == compose_le(&bytes).to_le_bytes()
    }
    QuickCheck::new().quickcheck(prop as fn(i64) -> bool);
}

#[test]
fn every_width_matches_composition() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(bytes: Vec<u8>, chunk: u8) -> TestResult {
        if bytes.len() < 15 {
            return TestResult::discard();
        }
        let mut reader = PrimitiveReader::new(Trickle::new(&bytes, usize::from(chunk)));
        let ok = u64::from(reader.read_u8().unwrap()) == compose_le(&bytes[..1])
            && u64::from(reader.read_u16().unwrap()) == compose_le(&bytes[1..3])
            && u64::from(reader.read_u32().unwrap()) == compose_le(&bytes[3..7])
            && reader.read_u64().unwrap() == compose_le(&bytes[7..15])
            && reader.total_bytes_read() == 15;
        TestResult::from_bool(ok)
    }
    QuickCheck::new().quickcheck(prop as fn(Vec<u8>, u8) -> TestResult);
}

#[test]
fn read_exact_advances_counter_by_n() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(data: Vec<u8>, before: usize, n: usize, chunk: u8) -> bool {
        let before = before % (data.len() + 1);
        let n = n % (data.len() - before + 1);

        let mut reader = PrimitiveReader::new(Trickle::new(&data, usize::from(chunk)));
        reader.skip(before).unwrap();
        let prior = reader.total_bytes_read();

        let mut buf = vec![0u8; n];
        reader.read_exact(&mut buf).unwrap();
        reader.total_bytes_read() == prior + n as u64 && buf == data[before..before + n]
    }
    QuickCheck::new().quickcheck(prop as fn(Vec<u8>, usize, usize, u8) -> bool);
}

#[test]
fn short_source_never_yields_truncated_values() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(data: Vec<u8>) -> bool {
        let short = &data[..data.len().min(7)];
        let mut reader = PrimitiveReader::new(short);
        let failed = matches!(
            reader.read_i64(),
            Err(ReadError::EndOfStream { offset: 0 })
        );
        failed && reader.total_bytes_read() == 0
    }
    QuickCheck::new().quickcheck(prop as fn(Vec<u8>) -> bool);
}

#[test]
fn partial_int_after_successful_reads() {
    let mut reader = PrimitiveReader::new(&[0xAA, 0x01, 0x02][..]);
    assert_eq!(reader.read_u8().unwrap(), 0xAA);

    let err = reader.read_u32().unwrap_err();
    assert!(matches!(err, ReadError::EndOfStream { offset: 1 }));
    assert_eq!(reader.total_bytes_read(), 1);
}

#[test]
fn doubles_from_wire_bytes() {
    // 5.05 as it appears in the bsonspec.org example document.
    let bytes = hex::decode("3333333333331440").unwrap();
    let mut reader = PrimitiveReader::new(bytes.as_slice());
    assert_eq!(reader.read_f64().unwrap().to_bits(), 5.05f64.to_bits());
}

#[test]
fn nan_bits_are_preserved() {
    let bits: u32 = 0x7FC0_0001;
    let bytes = bits.to_le_bytes();
    let mut reader = PrimitiveReader::new(&bytes[..]);
    assert_eq!(reader.read_f32().unwrap().to_bits(), bits);
}

#[test]
fn skip_zero_touches_nothing() {
    let mut reader = PrimitiveReader::new(&[1u8][..]);
    assert_eq!(reader.skip(0).unwrap(), 0);
    assert_eq!(reader.total_bytes_read(), 0);
    assert_eq!(reader.read_u8().unwrap(), 1);
}

#[test]
fn skip_near_end_is_best_effort() {
    let data = [1u8, 2, 3, 4];
    let mut reader = PrimitiveReader::new(Trickle::new(&data, 1));
    assert_eq!(reader.read_u16().unwrap(), 0x0201);
    assert_eq!(reader.skip(100).unwrap(), 2);
    assert_eq!(reader.total_bytes_read(), 4);
    assert!(reader.get_ref().remaining().is_empty());
}

#[test]
fn line_reads_always_fail() {
    let mut reader = PrimitiveReader::new(&b"a line\n"[..]);
    for _ in 0..2 {
        assert!(matches!(
            reader.read_line(),
            Err(ReadError::UnsupportedOperation { .. })
        ));
    }
    assert_eq!(reader.total_bytes_read(), 0);
}
