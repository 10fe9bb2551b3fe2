//! Error types for the bb84 crate.

use thiserror::Error;

/// Errors produced by exchange simulation and key handling.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Bb84Error {
    /// An exchange needs at least one photon.
    #[error("photon count must be at least 1")]
    InvalidPhotonCount,

    /// Noise probability outside the supported range.
    #[error("noise probability must lie in [0, {max}], got {got}", max = crate::MAX_NOISE)]
    InvalidNoise {
        /// The offending probability.
        got: f64,
    },

    /// A key string contained no `0`/`1` characters after filtering.
    #[error("key contains no usable bits — enter at least one 0 or 1")]
    EmptyKey,

    /// A message character does not fit the 8-bit encoding the cipher uses.
    #[error("character {0:?} does not fit in an 8-bit encoding")]
    UnencodableChar(char),
}

/// Result type for bb84 operations.
pub type Bb84Result<T> = Result<T, Bb84Error>;
