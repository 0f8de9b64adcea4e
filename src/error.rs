//! Error types for the tANS coder.

use thiserror::Error;

use crate::Symbol;

/// Error variants for table construction, encoding and decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The symbol spread does not describe a valid assignment of `L` slots.
    #[error("invalid symbol spread: {0}")]
    InvalidSpread(String),

    /// The symbol has no slot in the encoding table.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(Symbol),

    /// Decoding needed another bit but the stream was fully consumed.
    #[error("bitstream exhausted")]
    BitstreamExhausted,

    /// Precision exponent outside the supported range.
    #[error("invalid precision exponent: {0}")]
    InvalidPrecision(u32),

    /// Provided probability is invalid (e.g., negative or non-finite).
    #[error("invalid probability: {0}")]
    InvalidProbability(f32),

    /// Normalized state that no encoder run could have produced.
    #[error("invalid coder state: {0}")]
    InvalidState(u32),

    /// Decoding ended without returning to the initial state.
    #[error("decoder desynchronized: state {state}, {remaining} bits left")]
    Desynchronized {
        /// Normalized state when decoding stopped.
        state: u32,
        /// Bits left unread.
        remaining: usize,
    },
}

/// A specialized Result type for tANS operations.
pub type Result<T> = std::result::Result<T, Error>;
