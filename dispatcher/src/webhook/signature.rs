//! Webhook signature verification (HMAC-SHA256)
//!
//! The provider signs each delivery with the shared secret and sends the
//! result as `sha256=<hex>`. Verification runs over the raw body bytes, before
//! any decoding takes place.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm prefix expected on the signature header
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Computes the HMAC-SHA256 digest of `payload` keyed with `secret`.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, so construction cannot fail here.
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return Vec::new(),
    };
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a digest the way the provider does: `sha256=<lowercase hex>`.
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(signature))
}

/// Convenience for producing a full header value for `payload`.
pub fn sign(payload: &[u8], secret: &[u8]) -> String {
    format_signature_header(&compute_signature(payload, secret))
}

/// Verifies a delivery signature.
///
/// Returns `false` when the header is missing, lacks the `sha256=` prefix,
/// carries invalid hex, or does not match. An empty secret never verifies.
/// The digest comparison is constant-time.
pub fn verify(payload: &[u8], signature_header: Option<&str>, secret: &[u8]) -> bool {
    if secret.is_empty() {
        return false;
    }

    let Some(header) = signature_header else {
        return false;
    };
    let Some(hex_sig) = header.trim().strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    let Ok(provided) = hex::decode(hex_sig) else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    // verify_slice rejects length mismatches up front and compares the rest in
    // constant time.
    mac.verify_slice(&provided).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_signature() {
        let payload = br#"{"repository":{"full_name":"team/api"}}"#;
        let header = sign(payload, b"s3cret");
        assert!(verify(payload, Some(&header), b"s3cret"));
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2
        let digest = compute_signature(b"what do ya want for nothing?", b"Jefe");
        assert_eq!(
            format_signature_header(&digest),
            "sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_missing_header() {
        assert!(!verify(b"payload", None, b"secret"));
    }

    #[test]
    fn test_wrong_prefix() {
        let digest = compute_signature(b"payload", b"secret");
        let header = format!("sha1={}", hex::encode(digest));
        assert!(!verify(b"payload", Some(&header), b"secret"));
    }

    #[test]
    fn test_malformed_headers() {
        for header in ["", "sha256=", "sha256=zz", "sha256=abc", "garbage"] {
            assert!(!verify(b"payload", Some(header), b"secret"), "{header}");
        }
    }

    #[test]
    fn test_truncated_digest() {
        let header = sign(b"payload", b"secret");
        let truncated = &header[..header.len() - 2];
        assert!(!verify(b"payload", Some(truncated), b"secret"));
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        let digest = compute_signature(b"payload", b"secret");
        let header = format!("sha256={}", hex::encode_upper(digest));
        assert!(verify(b"payload", Some(&header), b"secret"));
    }

    #[test]
    fn test_empty_secret_never_verifies() {
        let header = sign(b"payload", b"");
        assert!(!verify(b"payload", Some(&header), b""));
    }

    #[test]
    fn test_reserialized_body_is_rejected() {
        let raw = br#"{"a": 1,   "b": 2}"#;
        let header = sign(raw, b"secret");

        let value: serde_json::Value = serde_json::from_slice(raw).unwrap();
        let reserialized = serde_json::to_vec(&value).unwrap();

        assert_ne!(raw.to_vec(), reserialized);
        assert!(!verify(&reserialized, Some(&header), b"secret"));
    }

    proptest! {
        #[test]
        fn prop_sign_then_verify(payload: Vec<u8>, secret in proptest::collection::vec(any::<u8>(), 1..64)) {
            let header = sign(&payload, &secret);
            prop_assert!(verify(&payload, Some(&header), &secret));
        }

        #[test]
        fn prop_wrong_secret_fails(
            payload: Vec<u8>,
            secret1 in proptest::collection::vec(any::<u8>(), 1..64),
            secret2 in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            prop_assume!(secret1 != secret2);
            let header = sign(&payload, &secret1);
            prop_assert!(!verify(&payload, Some(&header), &secret2));
        }

        #[test]
        fn prop_mutated_payload_fails(
            payload in proptest::collection::vec(any::<u8>(), 1..256),
            index: usize,
            flip in 1u8..=255,
        ) {
            let header = sign(&payload, b"secret");
            let mut mutated = payload.clone();
            let i = index % mutated.len();
            mutated[i] ^= flip;
            prop_assert!(!verify(&mutated, Some(&header), b"secret"));
        }

        #[test]
        fn prop_arbitrary_header_never_panics(header: String, payload: Vec<u8>) {
            let _ = verify(&payload, Some(&header), b"secret");
        }
    }
}
