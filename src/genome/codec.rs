//! 2-bit k-mer packing.
//!
//! A `Key` holds up to [`MAX_KMER_LEN`] nucleotides in a single `u128`. The
//! leading (leftmost) base sits in the most significant occupied bits, so
//! shifting left by one base and OR-ing in a new base is exactly the
//! de Bruijn edge rule.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::types::Base;

pub const MAX_KMER_LEN: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("k-mer is empty")]
    Empty,
    #[error("k-mer length {0} exceeds the supported maximum of {max}", max = MAX_KMER_LEN)]
    TooLong(usize),
    #[error("invalid nucleotide '{0}'")]
    InvalidBase(char),
    #[error("invalid extension code '{0}'")]
    InvalidExtension(char),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    bits: u128,
    len: u8,
}

impl Key {
    pub fn encode(kmer: &str) -> Result<Self, CodecError> {
        let len = kmer.chars().count();
        if len == 0 {
            return Err(CodecError::Empty);
        }
        if len > MAX_KMER_LEN {
            return Err(CodecError::TooLong(len));
        }

        let mut bits = 0u128;
        for c in kmer.chars() {
            let base = Base::from_char(c).ok_or(CodecError::InvalidBase(c))?;
            bits = (bits << 2) | base.bits();
        }

        Ok(Self {
            bits,
            len: len as u8,
        })
    }

    pub fn decode(&self) -> String {
        (0..self.len()).map(|i| self.base_at(i).to_char()).collect()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `index` counts from the leading base and must be below `len()`.
    fn base_at(&self, index: usize) -> Base {
        let shift = 2 * (self.len() - 1 - index);
        Base::from_bits(self.bits >> shift)
    }

    pub fn last_base(&self) -> Base {
        Base::from_bits(self.bits)
    }

    /// Drops the leading base and appends `next`, keeping the length.
    pub fn successor(&self, next: Base) -> Self {
        Self {
            bits: ((self.bits << 2) | next.bits()) & mask(self.len()),
            len: self.len,
        }
    }
}

fn mask(len: usize) -> u128 {
    if len >= MAX_KMER_LEN {
        u128::MAX
    } else {
        (1u128 << (2 * len)) - 1
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.decode())
    }
}

impl FromStr for Key {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::encode(s)
    }
}
