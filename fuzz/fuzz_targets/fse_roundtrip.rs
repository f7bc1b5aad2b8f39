#![no_main]
use std::sync::Arc;

use fse::{Frequencies, FseDecoder, FseEncoder, FseParams, FseTables};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, u8)| {
    let (input, log) = data;
    let table_log = (log as u32 % 8) + 8; // 8 to 15 bits

    // Arbitrary bytes through the frame decoder must error, never panic.
    let _ = fse::decode_stream_with_limit(&input, 1 << 20);

    if input.is_empty() {
        return;
    }

    let freqs = Frequencies::from_symbols(&input);
    let tables = match FseTables::new(&freqs, FseParams::new(table_log)) {
        Ok(t) => Arc::new(t),
        Err(_) => return,
    };
    let block = FseEncoder::new(tables.clone()).encode_block(&input).unwrap();
    let out = FseDecoder::new(tables).decode_block(block.as_bits()).unwrap();

    let output: Vec<u8> = out.symbols.iter().map(|&s| s as u8).collect();
    assert_eq!(input, output);
});
