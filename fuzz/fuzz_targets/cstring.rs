#![no_main]

use bsonio_wire::{BufferPool, PoolConfig, PrimitiveReader, StringLength};
use libfuzzer_sys::fuzz_target;

// Fuzz target: zero-terminated strings stop at the first zero byte and
// consume exactly up to and including it.
fuzz_target!(|input: (u8, Vec<u8>)| {
    let (min_capacity, bytes) = input;
    let mut pool = BufferPool::with_config(PoolConfig {
        min_capacity: usize::from(min_capacity),
        ..PoolConfig::default()
    });
    let mut reader = PrimitiveReader::new(bytes.as_slice());
    let ours = reader.read_string_with_pool(&mut pool, StringLength::NulTerminated);

    match bytes.iter().position(|&b| b == 0) {
        Some(end) => match std::str::from_utf8(&bytes[..end]) {
            Ok(expected) => {
                assert_eq!(ours.unwrap(), expected);
                assert_eq!(reader.total_bytes_read(), end as u64 + 1);
            }
            Err(_) => assert!(ours.is_err()),
        },
        None => assert!(ours.unwrap_err().is_end_of_stream()),
    }
});
