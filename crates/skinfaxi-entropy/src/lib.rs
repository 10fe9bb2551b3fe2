//! `skinfaxi-entropy` — quantum random bits with a local fallback.
//!
//! The simulation can source its uninformative measurement outcomes from a
//! public quantum random-number service. The service is strictly optional:
//! [`EntropySource::bits`] always succeeds, silently falling back to the
//! local pseudo-random generator on any transport, status, or payload
//! problem. Failures are logged at `debug` and never surfaced.

pub mod client;
pub mod error;
pub mod source;

pub use client::QrngClient;
pub use error::{EntropyError, EntropyResult};
pub use source::EntropySource;
