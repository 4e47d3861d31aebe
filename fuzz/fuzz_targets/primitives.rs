#![no_main]

use arbitrary::Arbitrary;
use bsonio_wire::PrimitiveReader;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Op {
    U8,
    Bool,
    I16,
    I32,
    I64,
    F64,
    Exact(u8),
    Skip(u8),
}

// Fuzz target: arbitrary sequences of primitive reads.
//
// The byte counter must only ever grow, by exactly the width of each
// successful read, and never past the input length.
fuzz_target!(|input: (Vec<Op>, Vec<u8>)| {
    let (ops, data) = input;
    let mut reader = PrimitiveReader::new(data.as_slice());
    for op in ops {
        let before = reader.total_bytes_read();
        let width = match op {
            Op::U8 => reader.read_u8().map(|_| 1),
            Op::Bool => reader.read_bool().map(|_| 1),
            Op::I16 => reader.read_i16().map(|_| 2),
            Op::I32 => reader.read_i32().map(|_| 4),
            Op::I64 => reader.read_i64().map(|_| 8),
            Op::F64 => reader.read_f64().map(|_| 8),
            Op::Exact(n) => {
                let mut buf = vec![0u8; usize::from(n)];
                reader.read_exact(&mut buf).map(|()| u64::from(n))
            }
            Op::Skip(n) => reader.skip(usize::from(n)).map(|s| s as u64),
        };
        match width {
            Ok(w) => assert_eq!(reader.total_bytes_read(), before + w),
            Err(_) => assert_eq!(reader.total_bytes_read(), before),
        }
        assert!(reader.total_bytes_read() <= data.len() as u64);
    }
});
