//! Credential derivation for obs-websocket authentication.
//!
//! ```text
//! step1      = base64(sha256(secret || salt))
//! credential = base64(sha256(step1 || challenge))
//! ```
//!
//! All inputs are concatenated as their UTF-8 text bytes. `step1` joins the
//! challenge as base64 text, not decoded back to binary. Standard alphabet
//! with padding.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// Derive the credential submitted in an `Authenticate` request.
///
/// Pure and deterministic. An empty secret is hashed like any other.
pub fn derive_credential(secret: &str, salt: &str, challenge: &str) -> String {
    let step1 = hash_then_encode(secret, salt);
    hash_then_encode(&step1, challenge)
}

/// `base64(sha256(a || b))`
fn hash_then_encode(a: &str, b: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(a.as_bytes());
    hasher.update(b.as_bytes());
    STANDARD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(
            derive_credential("password", "salt", "challenge"),
            "zTM5ki6L2vVvBQiTG9ckH1Lh64AbnCf6XZ226UmnkIA="
        );
        assert_eq!(
            derive_credential("P", "S", "C"),
            "G8jCK6O6cOChKMY3K/UgX90r3YH8JM5AgVYpOM6zwRY="
        );
    }

    #[test]
    fn test_empty_secret_still_derives() {
        assert_eq!(
            derive_credential("", "salt", "challenge"),
            "5fmcrqR0I7snYOpUX/Ac22UdSA81TwCyHqCr6eFQyyI="
        );
    }

    #[test]
    fn test_non_ascii_secret_uses_utf8_bytes() {
        assert_eq!(
            derive_credential("pässwörd", "salt", "challenge"),
            "HZK1LOHwXrKlpnv1fuHj81RJp8bxl+oeaPku0dUbXTc="
        );
    }

    #[test]
    fn test_output_is_padded_standard_base64() {
        let credential = derive_credential("password", "salt", "challenge");
        // 32-byte digest encodes to 44 chars with one pad
        assert_eq!(credential.len(), 44);
        assert!(credential.ends_with('='));
        assert!(STANDARD.decode(&credential).is_ok());
    }

    #[test]
    fn test_inputs_are_not_interchangeable() {
        let base = derive_credential("password", "salt", "challenge");
        assert_ne!(base, derive_credential("salt", "password", "challenge"));
        assert_ne!(base, derive_credential("password", "challenge", "salt"));
    }

    proptest! {
        #[test]
        fn prop_deterministic(secret in ".*", salt in ".*", challenge in ".*") {
            prop_assert_eq!(
                derive_credential(&secret, &salt, &challenge),
                derive_credential(&secret, &salt, &challenge)
            );
        }

        #[test]
        fn prop_single_byte_change_alters_output(
            secret in "[a-z]{1,16}",
            salt in "[a-z]{1,16}",
            challenge in "[a-z]{1,16}",
            which in 0usize..3,
        ) {
            let base = derive_credential(&secret, &salt, &challenge);

            // Flip the first byte of one input; stays ASCII, so still valid UTF-8
            let flip = |s: &str| {
                let mut bytes = s.as_bytes().to_vec();
                bytes[0] ^= 0x01;
                String::from_utf8(bytes).unwrap()
            };
            let changed = match which {
                0 => derive_credential(&flip(&secret), &salt, &challenge),
                1 => derive_credential(&secret, &flip(&salt), &challenge),
                _ => derive_credential(&secret, &salt, &flip(&challenge)),
            };
            prop_assert_ne!(base, changed);
        }
    }
}
