#![no_main]
use libfuzzer_sys::fuzz_target;
use tans::{Coder, Symbol};

fuzz_target!(|data: (Vec<u8>, Vec<u8>, u8)| {
    let (spread_bytes, input_bytes, precision_log) = data;
    let precision_log = (precision_log as u32 % 10) + 1; // 1 to 10 bits
    let nstates = 1usize << precision_log;

    if spread_bytes.is_empty() {
        return;
    }

    // Any assignment of symbols to slots is a valid spread.
    let spread: Vec<Symbol> = (0..nstates)
        .map(|i| (spread_bytes[i % spread_bytes.len()] % 8) as Symbol)
        .collect();
    let coder = match Coder::new(&spread, precision_log) {
        Ok(coder) => coder,
        Err(_) => return,
    };

    let input: Vec<Symbol> = input_bytes
        .iter()
        .map(|&b| spread[b as usize % nstates])
        .collect();

    let (state, bits) = coder.encode(&input).unwrap();
    let output = coder.decode_exact(state, &bits, input.len()).unwrap();
    assert_eq!(input, output);
    if !coder.tables().is_degenerate() {
        assert_eq!(coder.decode(state, &bits).unwrap(), input);
    }
});
