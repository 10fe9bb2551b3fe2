//! Measurement bases and polarisation angles.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One of the two conjugate BB84 measurement bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Basis {
    /// 0° / 90° polarisation states.
    Rectilinear,
    /// 45° / 135° polarisation states.
    Diagonal,
}

impl Basis {
    /// Draw a basis uniformly at random.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Basis::Rectilinear
        } else {
            Basis::Diagonal
        }
    }

    /// Polarisation angle in degrees for a bit prepared in this basis.
    ///
    /// Rectilinear encodes 0 → 0°, 1 → 90°; diagonal encodes 0 → 45°,
    /// 1 → 135°.
    pub fn polarisation(self, bit: bool) -> u16 {
        match (self, bit) {
            (Basis::Rectilinear, false) => 0,
            (Basis::Rectilinear, true) => 90,
            (Basis::Diagonal, false) => 45,
            (Basis::Diagonal, true) => 135,
        }
    }

    /// Analyser orientation in degrees for a measurement in this basis.
    pub fn analyser_angle(self) -> u16 {
        match self {
            Basis::Rectilinear => 0,
            Basis::Diagonal => 45,
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Rectilinear => write!(f, "rect"),
            Basis::Diagonal => write!(f, "diag"),
        }
    }
}
