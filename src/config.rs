//! Coder configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest supported precision exponent (`L = 2`).
pub const MIN_PRECISION_LOG: u32 = 1;

/// Largest supported precision exponent.
///
/// States stay below `2 * L`, so `u32` arithmetic never overflows.
pub const MAX_PRECISION_LOG: u32 = 24;

/// Configuration for building a [`Coder`](crate::Coder).
///
/// The precision exponent `lnL` fixes the number of states `L = 2^lnL`.
/// Larger tables approximate the probabilities more closely at the cost
/// of memory (two `L`-sized tables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoderConfig {
    /// Precision exponent; table size is `1 << precision_log`.
    pub precision_log: u32,
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self { precision_log: 12 }
    }
}

impl CoderConfig {
    /// Configuration with the given precision exponent.
    pub fn new(precision_log: u32) -> Self {
        Self { precision_log }
    }

    /// Small tables, suited to tiny alphabets.
    pub fn compact() -> Self {
        Self { precision_log: 8 }
    }

    /// Large tables for skewed distributions.
    pub fn high_precision() -> Self {
        Self { precision_log: 16 }
    }

    /// Number of states `L`.
    pub fn table_size(&self) -> u32 {
        1 << self.precision_log
    }

    /// Check that the precision exponent is supported.
    ///
    /// # Errors
    /// Returns `Error::InvalidPrecision` outside
    /// `MIN_PRECISION_LOG..=MAX_PRECISION_LOG`.
    pub fn validate(&self) -> Result<()> {
        validate_precision(self.precision_log)
    }
}

pub(crate) fn validate_precision(precision_log: u32) -> Result<()> {
    if !(MIN_PRECISION_LOG..=MAX_PRECISION_LOG).contains(&precision_log) {
        return Err(Error::InvalidPrecision(precision_log));
    }
    Ok(())
}
