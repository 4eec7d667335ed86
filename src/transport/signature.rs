//! `Linear-Signature` verification for inbound webhook deliveries.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{LinearError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Hex length of an HMAC-SHA256 digest.
const SIGNATURE_HEX_LEN: usize = 64;

fn mac(secret: &str) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| LinearError::InvalidParameter {
        name: "secret".to_string(),
        reason: "not usable as an HMAC key".to_string(),
    })
}

/// Hex-encoded HMAC-SHA256 of `body` keyed with `secret`.
pub fn sign_payload(body: &[u8], secret: &str) -> Result<String> {
    let mut mac = mac(secret)?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check `signature` against the exact bytes that were received.
///
/// The body must not be re-serialised before calling this: key order and
/// whitespace are part of what was signed.
pub fn verify_webhook_signature(raw_body: &[u8], signature: &str, secret: &str) -> bool {
    let signature = signature.trim();
    if signature.len() != SIGNATURE_HEX_LEN {
        return false;
    }

    let Ok(expected) = hex::decode(signature) else {
        return false;
    };

    let Ok(mut mac) = mac(secret) else {
        return false;
    };
    mac.update(raw_body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"action":"create","type":"Issue","data":{"id":"abc"}}"#;

    #[test]
    fn signed_payload_verifies() {
        let signature = sign_payload(BODY, "whsec").unwrap();
        assert_eq!(signature.len(), 64);
        assert!(verify_webhook_signature(BODY, &signature, "whsec"));
    }

    #[test]
    fn every_signed_payload_verifies_with_its_secret() {
        let mut payloads: Vec<Vec<u8>> = vec![
            Vec::new(),
            "{\"title\":\"Café ünïcode ✓\"}".as_bytes().to_vec(),
            vec![0x00, 0xff, 0xfe, 0x80, 0x7f],
        ];
        payloads.extend((0..32u8).map(|n| (0..n * 7).map(|b| b.wrapping_mul(31) ^ n).collect()));
        let long_secret = "k".repeat(200);
        let secrets: [&str; 4] = ["s", "whsec_0123456789abcdef", "sécret", long_secret.as_str()];

        for payload in &payloads {
            for secret in secrets {
                let signature = sign_payload(payload, secret).unwrap();
                assert!(
                    verify_webhook_signature(payload, &signature, secret),
                    "payload {payload:?} with secret {secret:?}"
                );
            }
        }
    }

    #[test]
    fn uppercase_hex_verifies() {
        let signature = sign_payload(BODY, "whsec").unwrap().to_uppercase();
        assert!(verify_webhook_signature(BODY, &signature, "whsec"));
    }

    #[test]
    fn tampered_payload_fails() {
        let signature = sign_payload(BODY, "whsec").unwrap();
        let tampered = br#"{"action":"create","type":"Issue","data":{"id":"abd"}}"#;
        assert!(!verify_webhook_signature(tampered, &signature, "whsec"));
    }

    #[test]
    fn wrong_secret_fails() {
        let signature = sign_payload(BODY, "whsec").unwrap();
        assert!(!verify_webhook_signature(BODY, &signature, "other"));
    }

    #[test]
    fn reformatted_body_fails() {
        let signature = sign_payload(BODY, "whsec").unwrap();
        let pretty = br#"{ "action": "create", "type": "Issue", "data": { "id": "abc" } }"#;
        assert!(!verify_webhook_signature(pretty, &signature, "whsec"));
    }

    #[test]
    fn short_signature_is_rejected() {
        assert!(!verify_webhook_signature(b"x", "short", "secret"));
        assert!(!verify_webhook_signature(b"x", "", "secret"));
    }

    #[test]
    fn non_hex_signature_of_right_length_is_rejected() {
        let bogus = "z".repeat(64);
        assert!(!verify_webhook_signature(b"x", &bogus, "secret"));
    }
}
