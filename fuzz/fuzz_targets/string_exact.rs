#![no_main]

use bsonio_wire::{BufferPool, PoolConfig, PrimitiveReader, StringLength};
use libfuzzer_sys::fuzz_target;

// Fuzz target: known-length strings must decode exactly like
// `String::from_utf8`, whatever the scratch buffer size.
fuzz_target!(|input: (u8, Vec<u8>)| {
    let (min_capacity, bytes) = input;
    let mut pool = BufferPool::with_config(PoolConfig {
        min_capacity: usize::from(min_capacity),
        ..PoolConfig::default()
    });
    let mut reader = PrimitiveReader::new(bytes.as_slice());
    let ours = reader.read_string_with_pool(&mut pool, StringLength::Exact(bytes.len()));
    match String::from_utf8(bytes.clone()) {
        Ok(expected) => assert_eq!(ours.unwrap(), expected),
        Err(_) => assert!(ours.is_err()),
    }
    let stats = pool.stats();
    assert_eq!(stats.checkouts, stats.checkins);
});
