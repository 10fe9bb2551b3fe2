//! The photon-exchange simulation loop and its aggregate statistics.
//!
//! One run models `n` independent photon transmissions:
//!
//!   1. The sender draws a basis and a bit and prepares the matching
//!      polarisation state.
//!   2. With an eavesdropper active, the interceptor measures in its own
//!      random basis — reading faithfully only when that basis matches the
//!      sender's — and re-sends its own state.
//!   3. The receiver draws a basis. On a basis match the forwarded bit is
//!      read, flipped with the configured noise probability; on a mismatch
//!      the outcome is an uninformative bit drawn from the [`BitPool`].
//!
//! The sifted positions (basis matches) yield the key and the QBER, and a
//! [`DetectionPolicy`] turns the QBER into an eavesdropper [`Verdict`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::basis::Basis;
use crate::error::{Bb84Error, Bb84Result};
use crate::key::SiftedKey;
use crate::photon::{Intercept, Measurement, PhotonEvent};

/// Upper bound on the channel-noise probability.
pub const MAX_NOISE: f64 = 0.1;

/// Default QBER level that raises a warning.
pub const QBER_WARN: f64 = 0.11;

/// Default QBER level above which eavesdropping is the likely explanation.
pub const QBER_ALARM: f64 = 0.20;

/// Supply of uninformative-outcome bits.
///
/// Mismatched-basis measurements consume one bit each. The pool is seeded
/// from an external entropy source when one is available and falls back to
/// the run's RNG once drained, so a short (or absent) pool never fails.
#[derive(Debug, Default, Clone)]
pub struct BitPool {
    bits: Vec<bool>,
    next: usize,
}

impl BitPool {
    /// Pool backed by pre-fetched bits.
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits, next: 0 }
    }

    /// Pool with no pre-fetched bits; every draw comes from the RNG.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of pre-fetched bits not yet handed out.
    pub fn remaining(&self) -> usize {
        self.bits.len().saturating_sub(self.next)
    }

    /// Next bit: pre-fetched while any remain, then from `rng`.
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> bool {
        match self.bits.get(self.next) {
            Some(&bit) => {
                self.next += 1;
                bit
            }
            None => rng.gen_bool(0.5),
        }
    }
}

/// How a QBER reading is turned into an eavesdropper verdict.
///
/// The two policies reflect the two threshold conventions in circulation:
/// absolute QBER cutoffs, or cutoffs relative to the noise level the
/// channel was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionPolicy {
    /// Absolute cutoffs: QBER above `warn` is elevated, above `alarm` the
    /// eavesdropper is the likely explanation. Both bounds are exclusive.
    FixedThresholds {
        /// Elevated-error threshold.
        warn: f64,
        /// Likely-eavesdropper threshold.
        alarm: f64,
    },
    /// Cutoffs relative to the configured noise probability: QBER above
    /// `noise + warn_margin` is elevated, above `noise + alarm_margin` is
    /// an alarm. Both bounds are exclusive.
    NoiseRelative {
        /// Margin over the configured noise for a warning.
        warn_margin: f64,
        /// Margin over the configured noise for an alarm.
        alarm_margin: f64,
    },
}

impl DetectionPolicy {
    /// The conventional relative policy: +2 % warns, +5 % alarms.
    pub fn noise_relative() -> Self {
        DetectionPolicy::NoiseRelative {
            warn_margin: 0.02,
            alarm_margin: 0.05,
        }
    }

    /// Classify an observed QBER under this policy.
    ///
    /// `noise` is the configured channel-noise probability; it only
    /// matters for [`DetectionPolicy::NoiseRelative`].
    pub fn judge(&self, qber: Option<f64>, noise: f64) -> Verdict {
        let Some(q) = qber else {
            return Verdict::InsufficientData;
        };
        let (warn, alarm) = match *self {
            DetectionPolicy::FixedThresholds { warn, alarm } => (warn, alarm),
            DetectionPolicy::NoiseRelative {
                warn_margin,
                alarm_margin,
            } => (noise + warn_margin, noise + alarm_margin),
        };
        if q > alarm {
            Verdict::EveLikely
        } else if q > warn {
            Verdict::Elevated
        } else {
            Verdict::Secure
        }
    }
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        DetectionPolicy::FixedThresholds {
            warn: QBER_WARN,
            alarm: QBER_ALARM,
        }
    }
}

/// Outcome of the eavesdropper check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Error rate consistent with a clean channel.
    Secure,
    /// Elevated error rate — heavy noise or eavesdropping.
    Elevated,
    /// Error rate high enough that eavesdropping is the likely cause.
    EveLikely,
    /// No sifted bits to judge from.
    InsufficientData,
}

impl Verdict {
    /// One-line summary for reports.
    pub fn describe(self) -> &'static str {
        match self {
            Verdict::Secure => "low error rate — key looks secure",
            Verdict::Elevated => "elevated error rate — noise or eavesdropping",
            Verdict::EveLikely => "high error rate — eavesdropping likely",
            Verdict::InsufficientData => "not enough basis matches to judge",
        }
    }
}

/// Parameters of one simulated exchange.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Number of photons to transmit (≥ 1).
    pub photons: usize,
    /// Whether the intercept-resend eavesdropper is active.
    pub eavesdropper: bool,
    /// Per-photon bit-flip probability on sifted measurements, in
    /// `[0, MAX_NOISE]`.
    pub noise: f64,
    /// Verdict policy applied to the observed QBER.
    pub policy: DetectionPolicy,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            photons: 100,
            eavesdropper: false,
            noise: 0.02,
            policy: DetectionPolicy::default(),
        }
    }
}

impl ExchangeConfig {
    fn validate(&self) -> Bb84Result<()> {
        if self.photons == 0 {
            return Err(Bb84Error::InvalidPhotonCount);
        }
        if !self.noise.is_finite() || !(0.0..=MAX_NOISE).contains(&self.noise) {
            return Err(Bb84Error::InvalidNoise { got: self.noise });
        }
        Ok(())
    }
}

/// Aggregate statistics over one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SiftSummary {
    /// Photons transmitted.
    pub photons: usize,
    /// Events where the bases matched.
    pub matches: usize,
    /// Sifted events where sender and receiver bits agree.
    pub agreements: usize,
    /// Sifted events where they disagree.
    pub disagreements: usize,
    /// `disagreements / matches`; `None` when there were no matches.
    pub qber: Option<f64>,
    /// Eavesdropper verdict under the configured policy.
    pub verdict: Verdict,
}

/// A completed exchange: the event log, its summary, and the sifted key.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    /// One record per transmitted photon, in transmission order.
    pub events: Vec<PhotonEvent>,
    /// Aggregate sift statistics.
    pub summary: SiftSummary,
    /// Sender bits at sifted positions. `None` when the eavesdropper was
    /// active — a key exchanged under interception is never retained.
    pub key: Option<SiftedKey>,
}

impl Exchange {
    /// Run an exchange with the thread-local RNG and no pre-fetched
    /// entropy.
    pub fn run(config: &ExchangeConfig) -> Bb84Result<Self> {
        Self::run_with_rng(config, &mut rand::thread_rng(), &mut BitPool::empty())
    }

    /// Run an exchange with an explicit RNG and bit pool.
    ///
    /// Seeding the RNG makes the run reproducible:
    /// ```rust
    /// use rand::SeedableRng;
    /// use skinfaxi_bb84::{BitPool, Exchange, ExchangeConfig};
    ///
    /// let mut rng = rand::rngs::SmallRng::seed_from_u64(42);
    /// let ex = Exchange::run_with_rng(
    ///     &ExchangeConfig::default(),
    ///     &mut rng,
    ///     &mut BitPool::empty(),
    /// ).unwrap();
    /// assert_eq!(ex.events.len(), 100);
    /// ```
    pub fn run_with_rng<R: Rng>(
        config: &ExchangeConfig,
        rng: &mut R,
        pool: &mut BitPool,
    ) -> Bb84Result<Self> {
        config.validate()?;
        debug!(
            photons = config.photons,
            eavesdropper = config.eavesdropper,
            noise = config.noise,
            "running photon exchange"
        );

        let mut events = Vec::with_capacity(config.photons);
        for _ in 0..config.photons {
            events.push(transmit_photon(config, rng, pool));
        }

        let summary = summarize(&events, config);
        let key = (!config.eavesdropper).then(|| {
            SiftedKey::new(
                events
                    .iter()
                    .filter(|e| e.bases_match)
                    .map(|e| e.sender_bit)
                    .collect(),
            )
        });

        debug!(
            matches = summary.matches,
            disagreements = summary.disagreements,
            verdict = ?summary.verdict,
            "exchange complete"
        );
        Ok(Self {
            events,
            summary,
            key,
        })
    }
}

fn transmit_photon<R: Rng>(config: &ExchangeConfig, rng: &mut R, pool: &mut BitPool) -> PhotonEvent {
    let sender_basis = Basis::random(rng);
    let sender_bit = rng.gen_bool(0.5);

    let intercept = config.eavesdropper.then(|| {
        let basis = Basis::random(rng);
        // Measurement disturbance: a wrong-basis read yields a random bit,
        // and that bit is what travels on.
        let bit = if basis == sender_basis {
            sender_bit
        } else {
            rng.gen_bool(0.5)
        };
        Intercept {
            basis,
            bit,
            angle: basis.polarisation(bit),
        }
    });

    let (channel_basis, channel_bit) = match intercept {
        Some(i) => (i.basis, i.bit),
        None => (sender_basis, sender_bit),
    };

    let receiver_basis = Basis::random(rng);
    let bases_match = receiver_basis == channel_basis;

    let (receiver_bit, measurement) = if bases_match {
        if rng.gen_bool(config.noise) {
            (!channel_bit, Measurement::NoiseFlipped)
        } else {
            (channel_bit, Measurement::Sifted)
        }
    } else {
        (pool.draw(rng), Measurement::RandomOutcome)
    };

    PhotonEvent {
        sender_basis,
        sender_bit,
        sender_angle: sender_basis.polarisation(sender_bit),
        intercept,
        receiver_basis,
        receiver_angle: receiver_basis.analyser_angle(),
        bases_match,
        receiver_bit,
        measurement,
    }
}

fn summarize(events: &[PhotonEvent], config: &ExchangeConfig) -> SiftSummary {
    let matches = events.iter().filter(|e| e.is_sifted()).count();
    let disagreements = events.iter().filter(|e| e.is_error()).count();
    let agreements = matches - disagreements;
    let qber = (matches > 0).then(|| disagreements as f64 / matches as f64);

    SiftSummary {
        photons: events.len(),
        matches,
        agreements,
        disagreements,
        qber,
        verdict: config.policy.judge(qber, config.noise),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_photons_is_an_error() {
        let config = ExchangeConfig {
            photons: 0,
            ..Default::default()
        };
        assert!(matches!(
            Exchange::run(&config),
            Err(Bb84Error::InvalidPhotonCount)
        ));
    }

    #[test]
    fn out_of_range_noise_is_an_error() {
        for noise in [-0.01, 0.11, f64::NAN] {
            let config = ExchangeConfig {
                noise,
                ..Default::default()
            };
            assert!(matches!(
                Exchange::run(&config),
                Err(Bb84Error::InvalidNoise { .. })
            ));
        }
    }

    #[test]
    fn pool_drains_before_rng() {
        let mut pool = BitPool::new(vec![true, false]);
        let mut rng = rand::thread_rng();
        assert_eq!(pool.remaining(), 2);
        assert!(pool.draw(&mut rng));
        assert!(!pool.draw(&mut rng));
        assert_eq!(pool.remaining(), 0);
        // Drained pool keeps yielding from the RNG.
        let _ = pool.draw(&mut rng);
    }

    #[test]
    fn fixed_policy_boundaries_are_exclusive() {
        let policy = DetectionPolicy::default();
        assert_eq!(policy.judge(Some(0.11), 0.0), Verdict::Secure);
        assert_eq!(policy.judge(Some(0.111), 0.0), Verdict::Elevated);
        assert_eq!(policy.judge(Some(0.20), 0.0), Verdict::Elevated);
        assert_eq!(policy.judge(Some(0.201), 0.0), Verdict::EveLikely);
        assert_eq!(policy.judge(None, 0.0), Verdict::InsufficientData);
    }

    #[test]
    fn relative_policy_tracks_configured_noise() {
        let policy = DetectionPolicy::noise_relative();
        assert_eq!(policy.judge(Some(0.05), 0.04), Verdict::Secure);
        assert_eq!(policy.judge(Some(0.07), 0.04), Verdict::Elevated);
        assert_eq!(policy.judge(Some(0.10), 0.04), Verdict::EveLikely);
    }
}
