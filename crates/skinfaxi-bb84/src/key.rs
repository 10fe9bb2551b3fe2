//! The sifted key retained after basis reconciliation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Bb84Error, Bb84Result};

/// Ordered sender bits at the positions where both parties measured in the
/// same basis.
///
/// Displays as a `0`/`1` string. Parsing accepts any text and keeps only
/// `0`/`1` characters, so a key pasted with whitespace or separators still
/// loads; an input with no usable bits is an [`Bb84Error::EmptyKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiftedKey {
    bits: Vec<bool>,
}

impl SiftedKey {
    /// Wrap raw bits as a key.
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Parse a key from text, keeping only `0`/`1` characters.
    pub fn parse(text: &str) -> Bb84Result<Self> {
        let bits: Vec<bool> = text
            .chars()
            .filter_map(|c| match c {
                '0' => Some(false),
                '1' => Some(true),
                _ => None,
            })
            .collect();
        if bits.is_empty() {
            return Err(Bb84Error::EmptyKey);
        }
        Ok(Self { bits })
    }

    /// The key bits in sift order.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of bits in the key.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the key holds no bits at all.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Infinite keystream: the key repeated bit by bit.
    pub fn cycle(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied().cycle()
    }
}

impl fmt::Display for SiftedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for SiftedKey {
    type Err = Bb84Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
