use std::sync::Arc;

use fse::{Frequencies, FseDecoder, FseEncoder, FseParams, FseTables};

fn main() -> fse::Result<()> {
    #[cfg(feature = "trace")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(true)
        .init();

    let input = (0..10000).map(|i| (i % 3) as u8).collect::<Vec<_>>();
    let freqs = Frequencies::from_symbols(&input);
    let tables = Arc::new(FseTables::new(&freqs, FseParams::default())?);
    let encoder = FseEncoder::new(tables.clone());
    let decoder = FseDecoder::new(tables);

    for _ in 0..1000 {
        let block = encoder.encode_block(&input)?;
        let out = decoder.decode_block(block.as_bits())?;
        assert_eq!(out.symbols.len(), input.len());
    }
    Ok(())
}
