use std::sync::Arc;

use fse::{
    Error, Frequencies, FseDecoder, FseEncoder, FseParams, FseTables, FrameOptions, SymbolMap,
};
use proptest::prelude::*;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn codec(freqs: &Frequencies, table_log: u32) -> (FseEncoder, FseDecoder) {
    let tables = Arc::new(FseTables::new(freqs, FseParams::new(table_log)).unwrap());
    (FseEncoder::new(tables.clone()), FseDecoder::new(tables))
}

#[test]
fn test_three_symbol_strings_roundtrip() {
    let (map, freqs) = SymbolMap::from_counts([("A", 3), ("B", 3), ("C", 2)]).unwrap();
    let (enc, dec) = codec(&freqs, 4);

    let ids = map.ids(&["A", "C", "B"]).unwrap();
    let block = enc.encode_block(&ids).unwrap();
    let decoded = dec.decode_block(block.as_bits()).unwrap();
    assert_eq!(map.symbols(&decoded.symbols).unwrap(), vec!["A", "C", "B"]);
}

#[test]
fn test_single_symbol_alphabet() {
    let (map, freqs) = SymbolMap::from_counts([("A", 10)]).unwrap();
    let (enc, dec) = codec(&freqs, 4);
    assert_eq!(enc.tables().normalized().weights(), &[16]);

    for n in [1, 2, 17, 500] {
        let input = vec!["A"; n];
        let block = enc.encode_block(&map.ids(&input).unwrap()).unwrap();
        let decoded = dec.decode_block(block.as_bits()).unwrap();
        assert_eq!(map.symbols(&decoded.symbols).unwrap(), input);
    }
}

#[test]
fn test_empty_block_is_zero_length_field() {
    let (enc, dec) = codec(&Frequencies::new(vec![3, 3, 2]), 4);
    let block = enc.encode_block::<u16>(&[]).unwrap();
    assert_eq!(block.bit_len(), 32);
    assert!(block.as_bits().not_any());
    assert!(dec.decode_block(block.as_bits()).unwrap().symbols.is_empty());
}

#[test]
fn test_skewed_pair_normalization() {
    let (_, freqs) = SymbolMap::from_counts([("A", 100), ("B", 1)]).unwrap();
    let tables = FseTables::new(&freqs, FseParams::new(4)).unwrap();
    let w = tables.normalized().weights();
    assert_eq!(w.iter().sum::<u32>(), 16);
    assert!(w[0] >= 14);
    assert!(w[1] >= 1);
}

#[test]
fn test_large_skewed_block_near_entropy() {
    let mut rng = StdRng::seed_from_u64(42);
    let dist = WeightedIndex::new([70, 15, 10, 5]).unwrap();
    let input: Vec<u8> = (0..10_000).map(|_| dist.sample(&mut rng) as u8).collect();

    let freqs = Frequencies::from_symbols(&input);
    let (enc, dec) = codec(&freqs, 12);
    let block = enc.encode_block(&input).unwrap();
    let decoded = dec.decode_block(block.as_bits()).unwrap();

    let expected: Vec<u16> = input.iter().map(|&s| s as u16).collect();
    assert_eq!(decoded.symbols, expected);

    let rate = block.bits_per_symbol(input.len());
    let entropy = freqs.entropy();
    assert!(rate >= entropy - 1e-9, "rate {rate} below entropy {entropy}");
    assert!(rate <= entropy + 0.2, "rate {rate} vs entropy {entropy}");
}

#[test]
fn test_every_single_bit_flip_is_detected() {
    let freqs = Frequencies::new(vec![40, 30, 20, 10]);
    let (enc, dec) = codec(&freqs, 8);
    let input: Vec<u16> = (0..64).map(|i| ((i * 7) % 4) as u16).collect();
    let block = enc.encode_block(&input).unwrap();

    for i in 0..block.bit_len() {
        let mut bits = block.as_bits().to_bitvec();
        let flipped = !bits[i];
        bits.set(i, flipped);
        match dec.decode_block(&bits) {
            Ok(out) => assert_ne!(out.symbols, input, "flip at bit {i} went unnoticed"),
            Err(e) => assert!(matches!(e, Error::CorruptStream(_))),
        }
    }
}

#[test]
fn test_mismatched_tables_fail() {
    let (enc, _) = codec(&Frequencies::new(vec![90, 5, 5]), 6);
    let (_, dec) = codec(&Frequencies::new(vec![5, 5, 90]), 6);
    let input: Vec<u16> = vec![0; 40].into_iter().chain([1, 2, 1]).collect();
    let block = enc.encode_block(&input).unwrap();
    match dec.decode_block(block.as_bits()) {
        Ok(out) => assert_ne!(out.symbols, input),
        Err(e) => assert!(matches!(e, Error::CorruptStream(_))),
    }
}

#[test]
fn test_tables_shared_across_threads() {
    let freqs = Frequencies::new(vec![8, 4, 2, 1, 1]);
    let tables = Arc::new(FseTables::new(&freqs, FseParams::new(7)).unwrap());

    let handles: Vec<_> = (0..4u16)
        .map(|t| {
            let tables = tables.clone();
            std::thread::spawn(move || {
                let input: Vec<u16> = (0..1000).map(|i| ((i + t) % 5) as u16).collect();
                let block = FseEncoder::new(tables.clone()).encode_block(&input).unwrap();
                let out = FseDecoder::new(tables).decode_block(block.as_bits()).unwrap();
                out.symbols == input
            })
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_fse_roundtrip(
        counts in prop::collection::vec(0u32..1000, 1..32),
        table_log in 5u32..=12,
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..400),
    ) {
        let freqs = Frequencies::new(counts);
        let present: Vec<u16> = freqs.present().map(|s| s as u16).collect();
        prop_assume!(!present.is_empty());

        let (enc, dec) = codec(&freqs, table_log);
        let input: Vec<u16> = picks.iter().map(|i| present[i.index(present.len())]).collect();
        let block = enc.encode_block(&input).unwrap();
        let out = dec.decode_block(block.as_bits()).unwrap();
        prop_assert_eq!(out.symbols, input);
    }

    #[test]
    fn prop_independent_builds_identical(
        counts in prop::collection::vec(0u32..5000, 1..64),
        table_log in 6u32..=12,
    ) {
        let freqs = Frequencies::new(counts);
        prop_assume!(freqs.total() > 0);
        let a = FseTables::new(&freqs, FseParams::new(table_log)).unwrap();
        let b = FseTables::new(&freqs.clone(), FseParams::new(table_log)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_frame_roundtrip(
        input in prop::collection::vec(any::<u8>(), 0..3000),
        block_size in 0usize..2000,
    ) {
        let opts = FrameOptions { block_size, table_log: 11 };
        let frame = fse::encode_stream(&input, &opts).unwrap();
        prop_assert_eq!(fse::decode_stream(&frame.bytes).unwrap(), input);
    }
}
