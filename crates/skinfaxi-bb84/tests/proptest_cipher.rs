//! Property tests for the XOR cipher and key parsing.

use proptest::prelude::*;

use skinfaxi_bb84::{SiftedKey, xor_bits, xor_encrypt};

proptest! {
    /// Encrypt-then-decrypt restores the exact message bit sequence for
    /// any ASCII message and any non-empty binary key.
    #[test]
    fn xor_round_trips(
        message in "[ -~]{0,48}",
        key in "[01]{1,32}",
    ) {
        let key = SiftedKey::parse(&key).unwrap();
        let transcript = xor_encrypt(&key, &message).unwrap();
        prop_assert_eq!(transcript.decrypted_bits(), transcript.message_bits.clone());
        // The explicit helper agrees with the transcript.
        prop_assert_eq!(
            xor_bits(&transcript.cipher_bits, &key),
            transcript.message_bits
        );
    }

    /// Double application of the keystream is the identity on raw bits.
    #[test]
    fn xor_twice_is_identity(
        bits in proptest::collection::vec(any::<bool>(), 0..256),
        key in "[01]{1,16}",
    ) {
        let key = SiftedKey::parse(&key).unwrap();
        prop_assert_eq!(xor_bits(&xor_bits(&bits, &key), &key), bits);
    }

    /// Message bit stream is 8 bits per character, and the keystream
    /// matches its length.
    #[test]
    fn streams_share_the_message_length(
        message in "[ -~]{1,48}",
        key in "[01]{1,32}",
    ) {
        let key = SiftedKey::parse(&key).unwrap();
        let transcript = xor_encrypt(&key, &message).unwrap();
        prop_assert_eq!(transcript.message_bits.len(), message.len() * 8);
        prop_assert_eq!(transcript.keystream.len(), transcript.message_bits.len());
        prop_assert_eq!(transcript.cipher_bits.len(), transcript.message_bits.len());
    }

    /// Key parsing keeps exactly the 0/1 characters, in order.
    #[test]
    fn key_parse_is_a_filter(raw in "[01abcxyz ,;]{1,64}") {
        let expected: String = raw.chars().filter(|c| *c == '0' || *c == '1').collect();
        match SiftedKey::parse(&raw) {
            Ok(key) => prop_assert_eq!(key.to_string(), expected),
            Err(_) => prop_assert!(expected.is_empty()),
        }
    }
}
