use proptest::prelude::*;
use tans::{BinarySpread, BitStream, Coder, CoderConfig, CustomSpread, Error, Symbol};

proptest! {
    #[test]
    fn test_binary_roundtrip(
        prob in 0.01f32..0.99,
        precision_log in 1u32..14,
        input in prop::collection::vec(0u16..2, 0..300),
    ) {
        let source = BinarySpread::new(prob).unwrap();
        let coder = Coder::from_source(&source, &CoderConfig::new(precision_log)).unwrap();

        let (state, bits) = coder.encode(&input).unwrap();
        let output = coder.decode(state, &bits).unwrap();
        prop_assert_eq!(input, output);
    }

    #[test]
    fn test_block_roundtrip_through_bytes(
        prob in 0.05f32..0.95,
        block_bits in 1u32..5,
        input in prop::collection::vec(any::<u8>(), 0..100),
    ) {
        let source = BinarySpread::with_block_bits(prob, block_bits).unwrap();
        let coder = Coder::from_source(&source, &CoderConfig::new(10)).unwrap();
        let input: Vec<Symbol> = input
            .iter()
            .map(|&b| (b as Symbol) & ((1 << block_bits) - 1))
            .collect();

        let (state, bits) = coder.encode(&input).unwrap();
        // Persist and restore the stream as the caller would.
        let restored = BitStream::from_bytes(&bits.to_bytes(), bits.len()).unwrap();
        prop_assert_eq!(coder.decode(state, &restored).unwrap(), input);
    }

    #[test]
    fn test_custom_roundtrip(
        weights in prop::collection::vec(1u32..50, 2..12),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..200),
    ) {
        let total: u32 = weights.iter().sum();
        let probs: Vec<f32> = weights.iter().map(|&w| w as f32 / total as f32).collect();
        let source = CustomSpread::new(&probs).unwrap();
        let coder = Coder::from_source(&source, &CoderConfig::default()).unwrap();

        let input: Vec<Symbol> = picks
            .iter()
            .map(|i| i.index(weights.len()) as Symbol)
            .collect();
        let (state, bits) = coder.encode(&input).unwrap();
        prop_assert_eq!(coder.decode(state, &bits).unwrap(), input);
    }
}

#[test]
fn test_rejects_short_spread() {
    let err = Coder::new(&[0, 1, 0], 2).unwrap_err();
    assert!(matches!(err, Error::InvalidSpread(_)));
}

#[test]
fn test_shared_across_threads() {
    let source = CustomSpread::new(&[0.7, 0.2, 0.1]).unwrap();
    let coder = Coder::from_source(&source, &CoderConfig::compact()).unwrap();
    let input: Vec<Symbol> = (0..500).map(|i| (i * 7 % 10 / 4) as Symbol).collect();
    let expected = coder.encode(&input).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let (state, bits) = coder.encode(&input).unwrap();
                assert_eq!((state, bits.clone()), expected);
                assert_eq!(coder.decode(state, &bits).unwrap(), input);
            });
        }
    });
}
