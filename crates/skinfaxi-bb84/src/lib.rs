//! `skinfaxi-bb84` — BB84 photon-exchange simulation and key handling.
//!
//! Simulates the photon-by-photon exchange of the BB84 quantum key
//! distribution protocol between a sender and a receiver, with an optional
//! intercept-resend eavesdropper and a configurable channel-noise
//! probability:
//!
//! - **Exchange** — per-photon basis/bit draws, interception, basis
//!   reconciliation, noise injection, QBER aggregation
//! - **Detection** — eavesdropper verdicts under fixed or noise-relative
//!   QBER thresholds
//! - **Cipher** — the XOR keystream cipher driven by the sifted key, with
//!   a bit-by-bit transcript
//! - **Exercise** — detector-table drill rows for manual basis-matching
//!   practice
//!
//! # Quick start
//!
//! ```rust
//! use skinfaxi_bb84::{BitPool, Exchange, ExchangeConfig};
//! use rand::SeedableRng;
//!
//! let config = ExchangeConfig {
//!     photons: 64,
//!     noise: 0.0,
//!     ..ExchangeConfig::default()
//! };
//! let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
//! let exchange = Exchange::run_with_rng(&config, &mut rng, &mut BitPool::empty()).unwrap();
//!
//! // Without noise or an eavesdropper, every sifted bit agrees.
//! assert_eq!(exchange.summary.disagreements, 0);
//! assert!(exchange.key.is_some());
//! ```

pub mod basis;
pub mod cipher;
pub mod error;
pub mod exchange;
pub mod exercise;
pub mod key;
pub mod photon;

pub use basis::Basis;
pub use cipher::{XorTranscript, fold_diacritics, xor_bits, xor_encrypt};
pub use error::{Bb84Error, Bb84Result};
pub use exchange::{
    BitPool, DetectionPolicy, Exchange, ExchangeConfig, MAX_NOISE, SiftSummary, Verdict,
};
pub use exercise::{Detector, Exercise, ExerciseScore, Expected};
pub use key::SiftedKey;
pub use photon::{Intercept, Measurement, PhotonEvent};
