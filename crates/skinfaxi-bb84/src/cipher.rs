//! XOR keystream cipher driven by the sifted key.
//!
//! Each message character is encoded as 8 bits, the key is repeated to the
//! message's bit length, and the two streams are XOR-ed position by
//! position. The transcript keeps every intermediate stream so the
//! operation can be explained bit by bit — the point of the exercise is
//! seeing the one-time-pad mechanics, not hiding data.

use serde::Serialize;

use crate::error::{Bb84Error, Bb84Result};
use crate::key::SiftedKey;

/// Rendered in place of ciphertext that does not decode to printable
/// characters.
pub const UNPRINTABLE: &str = "(unprintable)";

/// Replace the common South-Slavic diacritics with their ASCII bases so
/// the message fits the 8-bit encoding.
pub fn fold_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'č' | 'ć' => 'c',
            'Č' | 'Ć' => 'C',
            'š' => 's',
            'Š' => 'S',
            'ž' => 'z',
            'Ž' => 'Z',
            other => other,
        })
        .collect()
}

/// XOR a bit stream against the repeated key.
///
/// Applying this twice with the same key restores the input.
pub fn xor_bits(bits: &[bool], key: &SiftedKey) -> Vec<bool> {
    bits.iter()
        .zip(key.cycle())
        .map(|(&m, k)| m ^ k)
        .collect()
}

/// One row of the bit-by-bit explanation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitTrace {
    /// Bit position within the message stream.
    pub position: usize,
    /// Message bit at this position.
    pub message_bit: u8,
    /// Keystream bit at this position.
    pub key_bit: u8,
    /// XOR of the two.
    pub cipher_bit: u8,
}

impl BitTrace {
    /// Explanation of the XOR outcome at this position.
    pub fn note(self) -> &'static str {
        if self.message_bit == self.key_bit {
            "same bits → 0"
        } else {
            "different bits → 1"
        }
    }
}

/// Full record of one encryption: all three bit streams plus the rendered
/// ciphertext.
#[derive(Debug, Clone, Serialize)]
pub struct XorTranscript {
    /// The message as encrypted (after diacritic folding).
    pub message: String,
    /// Message bits, 8 per character, most significant first.
    pub message_bits: Vec<bool>,
    /// Key bits repeated/truncated to the message length.
    pub keystream: Vec<bool>,
    /// XOR of message and keystream.
    pub cipher_bits: Vec<bool>,
    /// Ciphertext bytes rendered as characters, or [`UNPRINTABLE`].
    pub ciphertext: String,
}

impl XorTranscript {
    /// Per-position explanation rows.
    pub fn trace(&self) -> Vec<BitTrace> {
        self.message_bits
            .iter()
            .zip(&self.keystream)
            .zip(&self.cipher_bits)
            .enumerate()
            .map(|(position, ((&m, &k), &c))| BitTrace {
                position,
                message_bit: m as u8,
                key_bit: k as u8,
                cipher_bit: c as u8,
            })
            .collect()
    }

    /// Bits recovered by re-applying the keystream to the ciphertext.
    pub fn decrypted_bits(&self) -> Vec<bool> {
        self.cipher_bits
            .iter()
            .zip(&self.keystream)
            .map(|(&c, &k)| c ^ k)
            .collect()
    }
}

/// Encrypt `message` with the sifted key.
///
/// The key must contain at least one bit; message characters must fit in
/// 8 bits after diacritic folding.
pub fn xor_encrypt(key: &SiftedKey, message: &str) -> Bb84Result<XorTranscript> {
    if key.is_empty() {
        return Err(Bb84Error::EmptyKey);
    }

    let folded = fold_diacritics(message);
    let mut message_bits = Vec::with_capacity(folded.chars().count() * 8);
    for ch in folded.chars() {
        let code = u32::from(ch);
        if code > 0xFF {
            return Err(Bb84Error::UnencodableChar(ch));
        }
        for shift in (0..8).rev() {
            message_bits.push(code >> shift & 1 == 1);
        }
    }

    let keystream: Vec<bool> = key.cycle().take(message_bits.len()).collect();
    let cipher_bits = xor_bits(&message_bits, key);
    let ciphertext = render_bytes(&cipher_bits);

    Ok(XorTranscript {
        message: folded,
        message_bits,
        keystream,
        cipher_bits,
        ciphertext,
    })
}

/// Regroup cipher bits into bytes and render them as text, falling back to
/// the sentinel when any byte is not a printable Latin-1 character.
fn render_bytes(bits: &[bool]) -> String {
    let bytes: Vec<u8> = bits
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| acc << 1 | b as u8))
        .collect();

    let printable = bytes
        .iter()
        .all(|&b| (0x20..0x7F).contains(&b) || b >= 0xA0);
    if bytes.is_empty() || !printable {
        return UNPRINTABLE.to_string();
    }
    bytes.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        let key = SiftedKey::new(vec![]);
        assert!(matches!(
            xor_encrypt(&key, "hello"),
            Err(Bb84Error::EmptyKey)
        ));
    }

    #[test]
    fn all_zero_key_is_identity() {
        let key = SiftedKey::parse("0").unwrap();
        let transcript = xor_encrypt(&key, "hi").unwrap();
        assert_eq!(transcript.cipher_bits, transcript.message_bits);
        assert_eq!(transcript.ciphertext, "hi");
    }

    #[test]
    fn diacritics_fold_before_encoding() {
        let key = SiftedKey::parse("0").unwrap();
        let transcript = xor_encrypt(&key, "čaša žita").unwrap();
        assert_eq!(transcript.message, "casa zita");
    }

    #[test]
    fn wide_characters_are_rejected() {
        let key = SiftedKey::parse("1").unwrap();
        assert!(matches!(
            xor_encrypt(&key, "漢"),
            Err(Bb84Error::UnencodableChar('漢'))
        ));
    }

    #[test]
    fn keystream_repeats_short_keys() {
        let key = SiftedKey::parse("10").unwrap();
        let transcript = xor_encrypt(&key, "a").unwrap();
        assert_eq!(transcript.keystream.len(), 8);
        assert_eq!(
            transcript.keystream,
            vec![true, false, true, false, true, false, true, false]
        );
    }

    #[test]
    fn trace_rows_explain_each_position() {
        let key = SiftedKey::parse("1").unwrap();
        let transcript = xor_encrypt(&key, "A").unwrap(); // 0x41 = 01000001
        let trace = transcript.trace();
        assert_eq!(trace.len(), 8);
        assert_eq!(trace[0].message_bit, 0);
        assert_eq!(trace[0].key_bit, 1);
        assert_eq!(trace[0].cipher_bit, 1);
        assert_eq!(trace[0].note(), "different bits → 1");
        assert_eq!(trace[1].note(), "same bits → 0");
    }

    #[test]
    fn control_bytes_render_as_sentinel() {
        // 'A' ^ 'A'-pattern key yields 0x00 — not printable.
        let key = SiftedKey::parse("01000001").unwrap();
        let transcript = xor_encrypt(&key, "A").unwrap();
        assert_eq!(transcript.ciphertext, UNPRINTABLE);
    }
}
