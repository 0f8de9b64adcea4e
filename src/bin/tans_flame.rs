use tans::{Coder, CoderConfig, CustomSpread, Result, Symbol};

fn main() -> Result<()> {
    let input: Vec<Symbol> = (0..10000).map(|i| (i % 3) as Symbol).collect();
    let source = CustomSpread::new(&[0.5, 0.25, 0.25])?;
    let coder = Coder::from_source(&source, &CoderConfig::default())?;

    for _ in 0..1000 {
        let (state, bits) = coder.encode(&input)?;
        let output = coder.decode(state, &bits)?;
        assert_eq!(output.len(), input.len());
    }
    Ok(())
}
