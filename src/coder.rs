//! The tANS coder: encoding and decoding over a fixed pair of tables.
//!
//! Encoding walks the input backwards, so decoding produces symbols in
//! their original order. Both directions renormalize one bit at a time:
//! the encoder shifts bits out until the state fits the symbol's sub-state
//! range `[Ls, 2*Ls)`, and the decoder shifts them back in until the state
//! is at least `L`.

use crate::bits::BitStream;
use crate::config::CoderConfig;
use crate::error::{Error, Result};
use crate::spread::SpreadSource;
use crate::table::Tables;
use crate::Symbol;

/// tANS coder built once from a symbol spread.
///
/// The coder holds only immutable tables, so `encode` and `decode` take
/// `&self` and a single coder can serve many threads.
#[derive(Clone, Debug)]
pub struct Coder {
    tables: Tables,
}

impl Coder {
    /// Build the coder from a spread of length `1 << precision_log`.
    ///
    /// # Errors
    /// Propagates table construction errors (`InvalidSpread`,
    /// `InvalidPrecision`).
    pub fn new(spread: &[Symbol], precision_log: u32) -> Result<Self> {
        Ok(Self {
            tables: Tables::build(spread, precision_log)?,
        })
    }

    /// Build the coder from a spread using `config`.
    ///
    /// # Errors
    /// Returns `Error::InvalidPrecision` if `config` is out of range and
    /// `Error::InvalidSpread` if the spread length is not `L`.
    pub fn with_config(spread: &[Symbol], config: &CoderConfig) -> Result<Self> {
        config.validate()?;
        Self::new(spread, config.precision_log)
    }

    /// Ask `source` for a spread and build the coder from it. Every symbol in
    /// the source's support must receive a slot.
    ///
    /// # Errors
    /// Returns `Error::InvalidPrecision` if `config` is out of range,
    /// `Error::InvalidProbability` if the source rejects its distribution, and
    /// `Error::InvalidSpread` if the spread has the wrong length or leaves a
    /// support symbol without a slot.
    pub fn from_source<S: SpreadSource + ?Sized>(source: &S, config: &CoderConfig) -> Result<Self> {
        config.validate()?;
        let spread = source.spread(config.precision_log)?;
        Ok(Self {
            tables: Tables::build_with_support(
                &spread,
                config.precision_log,
                &source.support(),
            )?,
        })
    }

    /// The underlying tables.
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Precision exponent `lnL`.
    pub fn precision_log(&self) -> u32 {
        self.tables.precision_log()
    }

    /// Encode `sequence`.
    ///
    /// Returns `(final_state, bits)` where `final_state` is normalized
    /// (`x - L`). The empty sequence encodes to `(0, [])`.
    ///
    /// # Errors
    /// Returns `Error::UnknownSymbol` if a symbol has no slot.
    pub fn encode(&self, sequence: &[Symbol]) -> Result<(u32, BitStream)> {
        let nstates = self.tables.size();
        let encoding = self.tables.encoding();
        let mut bits = BitStream::new();
        let mut x = nstates;

        for &symbol in sequence.iter().rev() {
            let max_state = encoding.max_state(symbol)?;

            // x >= L >= Ls on entry, so halving stops inside [Ls, 2*Ls).
            while x > max_state {
                bits.push((x & 1) as u8);
                x >>= 1;
            }
            x = encoding.next_state(symbol, x)?;
        }

        log::trace!(
            "encoded {} symbols into {} bits, state {}",
            sequence.len(),
            bits.len(),
            x - nstates
        );
        Ok((x - nstates, bits))
    }

    /// Decode the sequence produced by [`encode`](Self::encode).
    ///
    /// Decoding stops when every bit has been consumed and the state is back
    /// at `L`, the state every encoding starts from. No sequence over a
    /// table with two or more symbols reaches that point early. For a
    /// single-symbol table the length is not recoverable from the state; use
    /// [`decode_exact`](Self::decode_exact) there.
    ///
    /// # Errors
    /// Returns `Error::InvalidState` for a state no encoding produces,
    /// `Error::BitstreamExhausted` if the stream runs out mid-symbol, and
    /// `Error::Desynchronized` if a single-symbol table is handed bits.
    pub fn decode(&self, state: u32, bits: &BitStream) -> Result<Vec<Symbol>> {
        let nstates = self.tables.size();
        self.check_state(state)?;
        if self.tables.is_degenerate() && !bits.is_empty() {
            return Err(Error::Desynchronized {
                state,
                remaining: bits.len(),
            });
        }

        let decoding = self.tables.decoding();
        let mut reader = bits.reader();
        let mut sequence = Vec::new();
        let mut x = state + nstates;
        loop {
            while x < nstates {
                let bit = reader.pop().ok_or(Error::BitstreamExhausted)?;
                x = (x << 1) | bit as u32;
            }
            if x == nstates && reader.is_empty() {
                break;
            }
            let entry = decoding
                .get(x - nstates)
                .ok_or(Error::InvalidState(x - nstates))?;
            sequence.push(entry.symbol);
            x = entry.rerank_state;
        }

        log::trace!(
            "decoded {} symbols from {} bits",
            sequence.len(),
            bits.len()
        );
        Ok(sequence)
    }

    /// Decode exactly `len` symbols, then check that the stream is fully
    /// consumed and the state is back at `L`.
    ///
    /// # Errors
    /// Returns `Error::BitstreamExhausted` if the stream runs out and
    /// `Error::Desynchronized` if bits or state are left over.
    pub fn decode_exact(&self, state: u32, bits: &BitStream, len: usize) -> Result<Vec<Symbol>> {
        let nstates = self.tables.size();
        self.check_state(state)?;

        let decoding = self.tables.decoding();
        let mut reader = bits.reader();
        // `len` is caller input; size the buffer by the stream instead.
        let mut sequence = Vec::with_capacity(len.min(bits.len() + 1));
        let mut x = state + nstates;
        for _ in 0..len {
            let entry = decoding
                .get(x - nstates)
                .ok_or(Error::InvalidState(x - nstates))?;
            sequence.push(entry.symbol);
            x = entry.rerank_state;
            while x < nstates {
                let bit = reader.pop().ok_or(Error::BitstreamExhausted)?;
                x = (x << 1) | bit as u32;
            }
        }

        if x != nstates || !reader.is_empty() {
            return Err(Error::Desynchronized {
                state: x - nstates,
                remaining: reader.remaining(),
            });
        }
        Ok(sequence)
    }

    fn check_state(&self, state: u32) -> Result<()> {
        if state >= self.tables.size() || (self.tables.is_degenerate() && state != 0) {
            return Err(Error::InvalidState(state));
        }
        Ok(())
    }
}
