//! Transition tables for tANS.
//!
//! Both tables are derived from a symbol spread: an assignment of each of
//! the `L = 2^lnL` slots to a symbol. A symbol occupying `Ls` slots owns
//! the sub-states `[Ls, 2*Ls)`.
//!
//! - The decoding table maps slot `i` to its symbol and to the sub-state
//!   `Ls + k`, where `k` counts the earlier occurrences of that symbol.
//! - The encoding table is the inverse: for symbol `s` and sub-state
//!   `Ls + k` it gives the state `L + p`, `p` being the slot of the k-th
//!   occurrence.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::validate_precision;
use crate::error::{Error, Result};
use crate::Symbol;

/// A decoding table record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodeEntry {
    /// The decoded symbol.
    pub symbol: Symbol,
    /// Next (non-normalized) state, in `[Ls, 2*Ls)`.
    pub rerank_state: u32,
}

/// Decoding table indexed by normalized state `X = x - L`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodingTable {
    entries: Vec<DecodeEntry>,
}

impl DecodingTable {
    /// Record for normalized state `index`.
    pub fn get(&self, index: u32) -> Option<&DecodeEntry> {
        self.entries.get(index as usize)
    }

    /// Number of records (`L`).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a built table.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All records in slot order.
    pub fn entries(&self) -> &[DecodeEntry] {
        &self.entries
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct SymbolInfo {
    /// Occurrences in the spread (`Ls`); zero for absent symbols.
    count: u32,
    /// Offset of this symbol's block in `next_states`.
    start: u32,
}

/// Encoding table: for each symbol, a dense block of next states indexed
/// by `state - Ls`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodingTable {
    symtab: Vec<SymbolInfo>,
    next_states: Vec<u32>,
}

impl EncodingTable {
    /// `Ls` for `symbol`, zero if it never occurs.
    pub fn count(&self, symbol: Symbol) -> u32 {
        self.symtab
            .get(symbol as usize)
            .map_or(0, |info| info.count)
    }

    /// Largest sub-state accepted for `symbol` (`2*Ls - 1`).
    ///
    /// # Errors
    /// Returns `Error::UnknownSymbol` if the symbol has no slots.
    pub fn max_state(&self, symbol: Symbol) -> Result<u32> {
        let info = self.info(symbol)?;
        Ok(2 * info.count - 1)
    }

    /// Next state for `symbol` from sub-state `state` in `[Ls, 2*Ls)`.
    ///
    /// # Errors
    /// Returns `Error::UnknownSymbol` if the symbol has no slots, and
    /// `Error::InvalidState` if `state` lies outside its sub-state range.
    pub fn next_state(&self, symbol: Symbol, state: u32) -> Result<u32> {
        let info = self.info(symbol)?;
        if state < info.count || state >= 2 * info.count {
            return Err(Error::InvalidState(state));
        }
        Ok(self.next_states[(info.start + state - info.count) as usize])
    }

    /// `(state, next_state)` pairs for `symbol` in ascending `state` order,
    /// or `None` if it has no slots.
    pub fn transitions(&self, symbol: Symbol) -> Option<impl Iterator<Item = (u32, u32)> + '_> {
        let info = self.info(symbol).ok()?;
        let block = &self.next_states[info.start as usize..(info.start + info.count) as usize];
        Some(
            block
                .iter()
                .enumerate()
                .map(move |(k, &next)| (info.count + k as u32, next)),
        )
    }

    /// Symbols with at least one slot, ascending.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symtab
            .iter()
            .enumerate()
            .filter(|(_, info)| info.count > 0)
            .map(|(s, _)| s as Symbol)
    }

    fn info(&self, symbol: Symbol) -> Result<SymbolInfo> {
        match self.symtab.get(symbol as usize) {
            Some(info) if info.count > 0 => Ok(*info),
            _ => Err(Error::UnknownSymbol(symbol)),
        }
    }
}

/// The pair of tables built from one symbol spread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tables {
    precision_log: u32,
    decoding: DecodingTable,
    encoding: EncodingTable,
}

impl Tables {
    /// Build tables from a spread of length `1 << precision_log`.
    ///
    /// # Errors
    /// Returns `Error::InvalidPrecision` for an unsupported exponent and
    /// `Error::InvalidSpread` if the spread length is not `L`.
    pub fn build(spread: &[Symbol], precision_log: u32) -> Result<Self> {
        Self::build_with_support(spread, precision_log, &[])
    }

    /// Like [`build`](Self::build), additionally requiring every symbol in
    /// `support` (the symbols with positive probability) to occupy a slot.
    ///
    /// # Errors
    /// Returns `Error::InvalidSpread` if a `support` symbol is missing.
    pub fn build_with_support(
        spread: &[Symbol],
        precision_log: u32,
        support: &[Symbol],
    ) -> Result<Self> {
        validate_precision(precision_log)?;
        let nstates = 1u32 << precision_log;
        if spread.len() != nstates as usize {
            return Err(Error::InvalidSpread(format!(
                "slot counts sum to {} but L = {}",
                spread.len(),
                nstates
            )));
        }

        // 1. Histogram: Ls for every symbol.
        let alphabet = spread.iter().map(|&s| s as usize + 1).max().unwrap_or(0);
        let mut counts = vec![0u32; alphabet];
        for &s in spread {
            counts[s as usize] += 1;
        }
        if let Some(&missing) = support
            .iter()
            .find(|&&s| counts.get(s as usize).map_or(true, |&c| c == 0))
        {
            return Err(Error::InvalidSpread(format!(
                "symbol {missing} has positive probability but no slot"
            )));
        }

        // Each symbol's encoding block starts where the previous one ends.
        let mut symtab = vec![SymbolInfo::default(); alphabet];
        let mut current = 0;
        for (info, &count) in symtab.iter_mut().zip(&counts) {
            info.count = count;
            info.start = current;
            current += count;
        }

        // 2 + 3. One pass over the slots fills both tables. `seen[s]` is the
        // number of earlier occurrences of `s`, so slot `x` holds the k-th
        // occurrence with sub-state `Ls + k`.
        let mut entries = Vec::with_capacity(nstates as usize);
        let mut next_states = vec![0u32; nstates as usize];
        let mut seen = vec![0u32; alphabet];
        for (x, &symbol) in spread.iter().enumerate() {
            let s = symbol as usize;
            let k = seen[s];
            seen[s] += 1;

            entries.push(DecodeEntry {
                symbol,
                rerank_state: counts[s] + k,
            });
            next_states[(symtab[s].start + k) as usize] = nstates + x as u32;
        }

        log::debug!(
            "built tANS tables: L = {}, {} symbols in use",
            nstates,
            counts.iter().filter(|&&c| c > 0).count()
        );

        Ok(Self {
            precision_log,
            decoding: DecodingTable { entries },
            encoding: EncodingTable {
                symtab,
                next_states,
            },
        })
    }

    /// Precision exponent `lnL`.
    pub fn precision_log(&self) -> u32 {
        self.precision_log
    }

    /// Number of states `L`.
    pub fn size(&self) -> u32 {
        1 << self.precision_log
    }

    /// The decoding table.
    pub fn decoding(&self) -> &DecodingTable {
        &self.decoding
    }

    /// The encoding table.
    pub fn encoding(&self) -> &EncodingTable {
        &self.encoding
    }

    /// Whether a single symbol owns every slot. Such tables encode every
    /// sequence to state 0 with no bits.
    pub fn is_degenerate(&self) -> bool {
        self.encoding.symtab.iter().any(|info| info.count == self.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_small_tables() {
        // L = 8, Ls(0) = 3, Ls(1) = 4, Ls(2) = 1
        let spread = [0, 1, 1, 0, 2, 1, 0, 1];
        let tables = Tables::build(&spread, 3).unwrap();

        let reranks: Vec<u32> = tables
            .decoding()
            .entries()
            .iter()
            .map(|e| e.rerank_state)
            .collect();
        assert_eq!(reranks, vec![3, 4, 5, 4, 1, 6, 5, 7]);

        let t0: Vec<_> = tables.encoding().transitions(0).unwrap().collect();
        assert_eq!(t0, vec![(3, 8), (4, 11), (5, 14)]);
        let t2: Vec<_> = tables.encoding().transitions(2).unwrap().collect();
        assert_eq!(t2, vec![(1, 12)]);
        assert_eq!(tables.encoding().max_state(1), Ok(7));
    }

    #[test]
    fn test_rejects_short_spread() {
        // Counts sum to L - 1.
        let err = Tables::build(&[0, 1, 0], 2).unwrap_err();
        assert!(matches!(err, Error::InvalidSpread(_)));
    }

    #[test]
    fn test_rejects_missing_support() {
        let err = Tables::build_with_support(&[0, 0, 1, 1], 2, &[0, 1, 2]).unwrap_err();
        assert!(matches!(err, Error::InvalidSpread(_)));
        assert!(Tables::build_with_support(&[0, 0, 1, 1], 2, &[0, 1]).is_ok());
    }

    #[test]
    fn test_unknown_symbol_lookups() {
        // Symbol 1 is inside the alphabet range but has no slot.
        let tables = Tables::build(&[0, 2, 0, 2], 2).unwrap();
        assert_eq!(tables.encoding().count(1), 0);
        assert_eq!(tables.encoding().max_state(1), Err(Error::UnknownSymbol(1)));
        assert_eq!(tables.encoding().max_state(9), Err(Error::UnknownSymbol(9)));
        assert!(tables.encoding().transitions(1).is_none());
        assert_eq!(tables.encoding().next_state(0, 4), Err(Error::InvalidState(4)));
        assert_eq!(tables.encoding().symbols().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_degenerate_detection() {
        assert!(Tables::build(&[3, 3, 3, 3], 2).unwrap().is_degenerate());
        assert!(!Tables::build(&[3, 3, 3, 1], 2).unwrap().is_degenerate());
    }

    proptest! {
        #[test]
        fn prop_tables_cover_substates(
            (precision_log, spread) in (1u32..8).prop_flat_map(|lnl| {
                (Just(lnl), prop::collection::vec(0u16..6, 1usize << lnl))
            }),
        ) {
            let tables = Tables::build(&spread, precision_log).unwrap();
            let nstates = tables.size();
            let encoding = tables.encoding();

            prop_assert_eq!(tables.decoding().len(), nstates as usize);
            for entry in tables.decoding().entries() {
                let ls = encoding.count(entry.symbol);
                prop_assert!(entry.rerank_state >= ls && entry.rerank_state < 2 * ls);
            }

            let mut hit = vec![false; nstates as usize];
            for s in encoding.symbols() {
                let ls = encoding.count(s);
                let states: Vec<u32> = encoding.transitions(s).unwrap().map(|(x, _)| x).collect();
                prop_assert_eq!(states, (ls..2 * ls).collect::<Vec<_>>());
                for (x, next) in encoding.transitions(s).unwrap() {
                    prop_assert!(next >= nstates && next < 2 * nstates);
                    let slot = (next - nstates) as usize;
                    prop_assert_eq!(spread[slot], s);
                    // Decoding the slot lands back on the sub-state.
                    prop_assert_eq!(tables.decoding().get(slot as u32).unwrap().rerank_state, x);
                    prop_assert!(!hit[slot]);
                    hit[slot] = true;
                }
            }
            prop_assert!(hit.into_iter().all(|h| h));
        }
    }
}
