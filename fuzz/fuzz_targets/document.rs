#![no_main]

use bsonio_wire::PrimitiveReader;
use libfuzzer_sys::fuzz_target;

// Fuzz target: the document walker over arbitrary bytes.
//
// Catches panics in string decoding, length handling and nesting.
fuzz_target!(|data: &[u8]| {
    let _ = bsonio_tests::read_document(&mut PrimitiveReader::new(data));
});
