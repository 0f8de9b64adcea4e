//! # Table-based Asymmetric Numeral Systems (tANS)
//!
//! *Near-entropy coding of a symbol sequence into one integer state plus a
//! stream of bits.*
//!
//! ## Intuition First
//!
//! A tANS coder keeps a single integer state `x` in `[L, 2L)`. Encoding a
//! symbol moves the state to one of the slots that symbol owns. Frequent
//! symbols own many slots, so they need few bits of state to address; rare
//! symbols own few slots and cost more. Bits that no longer fit in the
//! state are shifted out into the stream.
//!
//! ## The Tables
//!
//! Everything is driven by a *symbol spread*: an assignment of each of the
//! `L = 2^lnL` slots to a symbol. A symbol occupying `Ls` slots owns the
//! sub-states `[Ls, 2*Ls)`.
//!
//! ```text
//! slot:    0  1  2  3          decoding table     encoding table
//! spread:  0  1  0  1          0 -> (0, 2)        0: 2 -> 4, 3 -> 6
//!                              1 -> (1, 2)        1: 2 -> 5, 3 -> 7
//!                              2 -> (0, 3)
//!                              3 -> (1, 3)
//! ```
//!
//! ## Encoding and Decoding
//!
//! Encoding runs backwards over the input. For each symbol the state is
//! halved (emitting its low bit) until it falls in `[Ls, 2*Ls)`, then the
//! encoding table maps it to `L + slot`. Decoding reverses this in forward
//! order: look up the slot, emit its symbol, jump to its sub-state, and
//! read bits back from the tail of the stream until the state is at least
//! `L` again.
//!
//! ```
//! use tans::Coder;
//!
//! let coder = Coder::new(&[0, 1, 0, 1], 2)?;
//! let (state, bits) = coder.encode(&[1, 0, 1])?;
//! assert_eq!(coder.decode(state, &bits)?, vec![1, 0, 1]);
//! # Ok::<(), tans::Error>(())
//! ```
//!
//! ## Spread Sources
//!
//! Quantizing probabilities into a spread is behind the [`SpreadSource`]
//! trait. [`BinarySpread`] and [`CustomSpread`] quantize a distribution;
//! [`FixedSpread`] passes an assignment through unchanged.
//!
//! ## Failure Modes
//!
//! 1. **Unknown symbols**: a symbol with no slot cannot be encoded.
//! 2. **Single-symbol tables**: every sequence encodes to state 0 with no
//!    bits, so only [`Coder::decode_exact`] can recover its length.
//!
//! ## References
//!
//! - Duda, J. (2009). "Asymmetric numeral systems: entropy coding combining speed of Huffman coding with compression rate of arithmetic coding."
//! - Duda, J. (2013). "Asymmetric numeral systems: entropy coding combining speed of Huffman coding with compression rate of arithmetic coding" (arXiv:1311.2540).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bits;
pub mod coder;
pub mod config;
pub mod error;
pub mod spread;
pub mod table;

/// Symbol identifier: an index into a fixed alphabet.
pub type Symbol = u16;

pub use bits::{BitReader, BitStream};
pub use coder::Coder;
pub use config::CoderConfig;
pub use error::{Error, Result};
pub use spread::{BinarySpread, CustomSpread, FixedSpread, SpreadSource};
pub use table::{DecodeEntry, DecodingTable, EncodingTable, Tables};
