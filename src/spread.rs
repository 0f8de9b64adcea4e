//! Symbol spreads: quantizing probabilities into `L` slots.
//!
//! A spread source turns a distribution into an assignment of the
//! `L = 2^lnL` table slots to symbols. Each symbol with positive
//! probability receives at least one slot. How the slots are arranged only
//! affects compression efficiency, never correctness of the tables.

use crate::config::validate_precision;
use crate::error::{Error, Result};
use crate::Symbol;

/// Tolerance on the sum of a probability vector.
const PROB_SUM_TOLERANCE: f64 = 1e-3;

/// Largest block width accepted by [`BinarySpread`].
pub const MAX_BLOCK_BITS: u32 = 12;

/// Produces the symbol spread the table builder consumes.
pub trait SpreadSource {
    /// Assignment of `1 << precision_log` slots to symbols.
    fn spread(&self, precision_log: u32) -> Result<Vec<Symbol>>;

    /// Symbols that must occupy at least one slot.
    fn support(&self) -> Vec<Symbol> {
        Vec::new()
    }
}

/// Spread for i.i.d. bits with `P(1) = prob`, grouped into blocks.
///
/// With `block_bits == 1` the alphabet is `{0, 1}`. With `n` block bits the
/// alphabet is every `n`-bit block, symbol `b` having probability
/// `prob^ones(b) * (1 - prob)^(n - ones(b))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinarySpread {
    prob: f32,
    block_bits: u32,
}

impl BinarySpread {
    /// Binary alphabet with `P(1) = prob`.
    ///
    /// # Errors
    /// Returns `Error::InvalidProbability` unless `prob` is finite and in
    /// `[0, 1]`.
    pub fn new(prob: f32) -> Result<Self> {
        Self::with_block_bits(prob, 1)
    }

    /// Alphabet of `block_bits`-wide blocks of bits with `P(1) = prob`.
    ///
    /// # Errors
    /// Returns `Error::InvalidProbability` for a bad `prob` and
    /// `Error::InvalidSpread` for a block width outside `1..=MAX_BLOCK_BITS`.
    pub fn with_block_bits(prob: f32, block_bits: u32) -> Result<Self> {
        if !prob.is_finite() || !(0.0..=1.0).contains(&prob) {
            return Err(Error::InvalidProbability(prob));
        }
        if !(1..=MAX_BLOCK_BITS).contains(&block_bits) {
            return Err(Error::InvalidSpread(format!(
                "block width {block_bits} outside 1..={MAX_BLOCK_BITS}"
            )));
        }
        Ok(Self { prob, block_bits })
    }

    /// Probability of each block, indexed by the block's value.
    pub fn probabilities(&self) -> Vec<f64> {
        let p = self.prob as f64;
        (0..1u32 << self.block_bits)
            .map(|block| {
                let ones = block.count_ones() as i32;
                p.powi(ones) * (1.0 - p).powi(self.block_bits as i32 - ones)
            })
            .collect()
    }
}

impl SpreadSource for BinarySpread {
    fn spread(&self, precision_log: u32) -> Result<Vec<Symbol>> {
        let counts = quantize(&self.probabilities(), precision_log)?;
        spread_counts(&counts, precision_log)
    }

    fn support(&self) -> Vec<Symbol> {
        positive(&self.probabilities())
    }
}

/// Spread for an arbitrary alphabet; symbol `i` has probability `probs[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomSpread {
    probs: Vec<f64>,
}

impl CustomSpread {
    /// # Errors
    /// Returns `Error::InvalidProbability` if any entry is negative or
    /// non-finite, or if the entries do not sum to 1.
    pub fn new(probs: &[f32]) -> Result<Self> {
        if probs.is_empty() || probs.len() > Symbol::MAX as usize + 1 {
            return Err(Error::InvalidSpread(format!(
                "alphabet of {} symbols",
                probs.len()
            )));
        }
        if let Some(&bad) = probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(Error::InvalidProbability(bad));
        }
        let sum: f64 = probs.iter().map(|&p| p as f64).sum();
        if (sum - 1.0).abs() > PROB_SUM_TOLERANCE {
            return Err(Error::InvalidProbability(sum as f32));
        }
        Ok(Self {
            probs: probs.iter().map(|&p| p as f64).collect(),
        })
    }

    /// The probability vector.
    pub fn probabilities(&self) -> &[f64] {
        &self.probs
    }
}

impl SpreadSource for CustomSpread {
    fn spread(&self, precision_log: u32) -> Result<Vec<Symbol>> {
        let counts = quantize(&self.probs, precision_log)?;
        spread_counts(&counts, precision_log)
    }

    fn support(&self) -> Vec<Symbol> {
        positive(&self.probs)
    }
}

/// An explicit, already quantized assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedSpread(pub Vec<Symbol>);

impl SpreadSource for FixedSpread {
    fn spread(&self, precision_log: u32) -> Result<Vec<Symbol>> {
        validate_precision(precision_log)?;
        Ok(self.0.clone())
    }
}

/// Quantize `probs` into integer slot counts summing to `1 << precision_log`.
///
/// Every positive probability gets at least one slot and zero
/// probabilities get none. Counts start at `floor(p * L)` and the remaining
/// slots go to the largest remainders; if the floor of one pushes the total
/// past `L`, slots are taken back from the most over-represented symbols.
///
/// # Errors
/// Returns `Error::InvalidPrecision` for an unsupported exponent,
/// `Error::InvalidProbability` for a negative or non-finite entry, and
/// `Error::InvalidSpread` if there are more positive probabilities than
/// slots, or none at all.
pub fn quantize(probs: &[f64], precision_log: u32) -> Result<Vec<u32>> {
    validate_precision(precision_log)?;
    if let Some(&bad) = probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(Error::InvalidProbability(bad as f32));
    }
    let total: f64 = probs.iter().sum();
    if !total.is_finite() {
        return Err(Error::InvalidProbability(total as f32));
    }
    let nstates = 1u32 << precision_log;
    let used = probs.iter().filter(|&&p| p > 0.0).count();
    if used == 0 {
        return Err(Error::InvalidSpread("no symbol has positive probability".into()));
    }
    if used > nstates as usize {
        return Err(Error::InvalidSpread(format!(
            "{used} symbols do not fit in {nstates} slots"
        )));
    }

    let targets: Vec<f64> = probs
        .iter()
        .map(|&p| p / total * nstates as f64)
        .collect();
    let mut counts: Vec<u32> = targets
        .iter()
        .map(|&t| if t > 0.0 { (t.floor() as u32).max(1) } else { 0 })
        .collect();
    let sum: u64 = counts.iter().map(|&c| c as u64).sum();

    // Each adjustment moves a symbol's remainder by a whole slot, below every
    // untouched symbol, so one ordering serves every pass.
    if sum < nstates as u64 {
        let mut order: Vec<usize> = (0..counts.len()).filter(|&s| targets[s] > 0.0).collect();
        order.sort_by(|&a, &b| {
            let rem = |s: usize| targets[s] - counts[s] as f64;
            rem(b).total_cmp(&rem(a))
        });
        for &s in order.iter().cycle().take((nstates as u64 - sum) as usize) {
            counts[s] += 1;
        }
    } else if sum > nstates as u64 {
        let mut order: Vec<usize> = (0..counts.len()).filter(|&s| counts[s] > 1).collect();
        order.sort_by(|&a, &b| {
            let over = |s: usize| counts[s] as f64 - targets[s];
            over(b).total_cmp(&over(a))
        });
        // The one-slot floors add fewer than `used <= L` slots, so symbols
        // above one slot can always absorb the excess.
        let mut excess = sum - nstates as u64;
        while excess > 0 {
            for &s in &order {
                if excess == 0 {
                    break;
                }
                if counts[s] > 1 {
                    counts[s] -= 1;
                    excess -= 1;
                }
            }
        }
    }

    log::debug!(
        "quantized {} probabilities into {} slots ({} symbols used)",
        probs.len(),
        nstates,
        used
    );
    Ok(counts)
}

/// Lay out `counts` over the `1 << precision_log` slots.
///
/// Symbols are placed in ascending order, stepping by `L/2 + L/8 + 3` and
/// skipping taken slots, so each symbol's occurrences scatter across the
/// table.
///
/// # Errors
/// Returns `Error::InvalidPrecision` for an unsupported exponent and
/// `Error::InvalidSpread` if `counts` does not sum to `L` or names more
/// symbols than `Symbol` can hold.
pub fn spread_counts(counts: &[u32], precision_log: u32) -> Result<Vec<Symbol>> {
    validate_precision(precision_log)?;
    let nstates = 1u32 << precision_log;
    if counts.len() > Symbol::MAX as usize + 1 {
        return Err(Error::InvalidSpread(format!(
            "alphabet of {} symbols",
            counts.len()
        )));
    }
    let sum: u64 = counts.iter().map(|&c| c as u64).sum();
    if sum != nstates as u64 {
        return Err(Error::InvalidSpread(format!(
            "slot counts sum to {sum} but L = {nstates}"
        )));
    }

    let mask = nstates - 1;
    let step = (nstates >> 1) + (nstates >> 3) + 3;
    let mut slots: Vec<Option<Symbol>> = vec![None; nstates as usize];
    let mut pos = 0u32;
    for (s, &count) in counts.iter().enumerate() {
        for _ in 0..count {
            while slots[pos as usize].is_some() {
                pos = (pos + 1) & mask;
            }
            slots[pos as usize] = Some(s as Symbol);
            pos = (pos + step) & mask;
        }
    }
    Ok(slots.into_iter().flatten().collect())
}

fn positive(probs: &[f64]) -> Vec<Symbol> {
    probs
        .iter()
        .enumerate()
        .filter(|(_, &p)| p > 0.0)
        .map(|(s, _)| s as Symbol)
        .collect()
}
