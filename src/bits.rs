//! Bit buffers for the coder.
//!
//! The encoder appends renormalization bits; the decoder reads them back
//! from the tail, so the last bit written is the first bit read. Reading
//! goes through a cursor and never mutates the stream, which lets the same
//! stream be decoded any number of times.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Append-only sequence of bits, each stored as `0` or `1`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BitStream {
    bits: Vec<u8>,
}

impl BitStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one bit. Any nonzero value is stored as `1`.
    pub fn push(&mut self, bit: u8) {
        self.bits.push((bit != 0) as u8);
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the stream holds no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bits in append order.
    pub fn as_slice(&self) -> &[u8] {
        &self.bits
    }

    /// Iterate bits in append order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.bits.iter().copied()
    }

    /// Cursor that yields bits from the tail.
    pub fn reader(&self) -> BitReader<'_> {
        BitReader {
            bits: &self.bits,
            cursor: self.bits.len(),
        }
    }

    /// Pack into bytes, LSB-first within each byte. The last byte is
    /// zero-padded; keep `len()` alongside to restore the stream.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |byte, (i, &bit)| byte | (bit << i))
            })
            .collect()
    }

    /// Unpack `len` bits produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    /// Returns `Error::BitstreamExhausted` if `bytes` holds fewer than
    /// `len` bits.
    pub fn from_bytes(bytes: &[u8], len: usize) -> Result<Self> {
        if bytes.len().saturating_mul(8) < len {
            return Err(Error::BitstreamExhausted);
        }
        let bits = (0..len).map(|i| (bytes[i / 8] >> (i % 8)) & 1).collect();
        Ok(Self { bits })
    }
}

impl FromIterator<u8> for BitStream {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut stream = Self::new();
        for bit in iter {
            stream.push(bit);
        }
        stream
    }
}

impl From<Vec<u8>> for BitStream {
    fn from(bits: Vec<u8>) -> Self {
        bits.into_iter().collect()
    }
}

/// Tail-first read cursor over a [`BitStream`].
#[derive(Clone, Debug)]
pub struct BitReader<'a> {
    bits: &'a [u8],
    cursor: usize,
}

impl BitReader<'_> {
    /// Next bit from the tail, or `None` once every bit has been read.
    pub fn pop(&mut self) -> Option<u8> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.bits[self.cursor])
    }

    /// Bits not yet read.
    pub fn remaining(&self) -> usize {
        self.cursor
    }

    /// Whether every bit has been read.
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }
}
