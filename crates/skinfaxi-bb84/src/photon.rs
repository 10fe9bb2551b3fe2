//! Per-photon event records.

use serde::Serialize;

use crate::basis::Basis;

/// How the receiver's bit for one photon came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    /// Bases matched and the bit was read cleanly.
    Sifted,
    /// Bases matched but channel noise flipped the bit.
    NoiseFlipped,
    /// Bases differed — the outcome is an uninformative random bit.
    RandomOutcome,
}

impl Measurement {
    /// Human-readable note for the event table.
    pub fn describe(self) -> &'static str {
        match self {
            Measurement::Sifted => "bases equal — clean measurement",
            Measurement::NoiseFlipped => "bases equal — noise flipped the bit",
            Measurement::RandomOutcome => "bases differ — random outcome",
        }
    }
}

/// The eavesdropper's measure-and-resend record for one photon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Intercept {
    /// Basis the interceptor measured in.
    pub basis: Basis,
    /// Bit the interceptor read (faithful iff its basis matched the sender's).
    pub bit: bool,
    /// Polarisation angle of the re-sent photon.
    pub angle: u16,
}

/// Everything recorded about one simulated photon transmission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhotonEvent {
    /// Sender's basis choice.
    pub sender_basis: Basis,
    /// Sender's raw bit.
    pub sender_bit: bool,
    /// Polarisation angle the sender prepared.
    pub sender_angle: u16,
    /// Present when the eavesdropper measured and re-sent this photon.
    pub intercept: Option<Intercept>,
    /// Receiver's basis choice.
    pub receiver_basis: Basis,
    /// Receiver's analyser orientation.
    pub receiver_angle: u16,
    /// Whether the receiver's basis matched the basis of the photon as it
    /// arrived (the interceptor's basis when one was active).
    pub bases_match: bool,
    /// The bit the receiver recorded.
    pub receiver_bit: bool,
    /// Which branch produced `receiver_bit`.
    pub measurement: Measurement,
}

impl PhotonEvent {
    /// A sifted event contributes to the key and to QBER.
    pub fn is_sifted(&self) -> bool {
        self.bases_match
    }

    /// Sender and receiver disagree on a sifted bit.
    pub fn is_error(&self) -> bool {
        self.bases_match && self.sender_bit != self.receiver_bit
    }
}
