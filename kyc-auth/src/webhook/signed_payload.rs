//! SHA-256 signatures over a sorted key/value rendering of the payload.

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::canonical::signing_string;
use super::WebhookValidator;
use crate::error::{webhook_error, Error, WebhookErrorKind};

/// Header names ShuftiPro signatures may arrive under, in lookup order.
///
/// The `HTTP_*` spellings are how CGI-style servers expose request headers.
pub const SHUFTI_PRO_SIGNATURE_HEADERS: [&str; 6] = [
    "HTTP_X_SHUFTIPRO_SIGNATURE",
    "HTTP_X_WEBHOOK_SIGNATURE",
    "HTTP_SIGNATURE",
    "X-ShuftiPro-Signature",
    "X-Webhook-Signature",
    "Signature",
];

/// Validator for `sha256(signing_string(payload) + secret)` signatures.
///
/// Unlike HMAC schemes the secret is appended to the signed text, and the text
/// is derived from the decoded payload instead of the raw body bytes.
pub struct SignedPayloadValidator {
    provider_id: String,
    secret: SecretString,
    signature_headers: Vec<String>,
}

impl SignedPayloadValidator {
    /// Create a new validator.
    ///
    /// # Arguments
    ///
    /// * `provider_id` - Provider identifier
    /// * `secret` - Shared webhook secret; blank secrets are rejected
    /// * `signature_headers` - Header names to look for, first match wins
    pub fn new(
        provider_id: String,
        secret: SecretString,
        signature_headers: &[&str],
    ) -> Result<Self, Error> {
        if secret.expose_secret().trim().is_empty() {
            return Err(webhook_error(
                WebhookErrorKind::MissingSecret,
                &format!("{} webhook secret is not configured", provider_id),
            ));
        }

        Ok(Self {
            provider_id,
            secret,
            signature_headers: signature_headers.iter().map(|h| h.to_string()).collect(),
        })
    }

    /// Validator preconfigured with the ShuftiPro header names.
    pub fn shufti_pro(secret: SecretString) -> Result<Self, Error> {
        Self::new("shuftipro".to_string(), secret, &SHUFTI_PRO_SIGNATURE_HEADERS)
    }

    /// Find the signature header value.
    ///
    /// Exact names are tried first, in order. Servers that normalize header
    /// names to lowercase are then matched case-insensitively against the same
    /// ordered list.
    pub fn extract_signature<'a>(&self, headers: &'a HashMap<String, String>) -> Option<&'a str> {
        self.signature_headers
            .iter()
            .find_map(|name| headers.get(name))
            .or_else(|| {
                self.signature_headers.iter().find_map(|name| {
                    headers
                        .iter()
                        .find(|(key, _)| key.eq_ignore_ascii_case(name))
                        .map(|(_, value)| value)
                })
            })
            .map(String::as_str)
    }

    /// Lowercase hex SHA-256 of the signing string followed by the secret.
    pub fn compute_signature(&self, payload: &Map<String, Value>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(signing_string(payload).as_bytes());
        hasher.update(self.secret.expose_secret().as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl WebhookValidator for SignedPayloadValidator {
    fn validate(&self, headers: &HashMap<String, String>, payload: &Map<String, Value>) -> bool {
        let received = match self.extract_signature(headers) {
            Some(signature) if !signature.is_empty() => signature,
            _ => {
                tracing::debug!(
                    provider = %self.provider_id,
                    "no signature found in webhook headers"
                );
                return false;
            }
        };

        let calculated = self.compute_signature(payload);
        let is_valid: bool = calculated.as_bytes().ct_eq(received.as_bytes()).into();

        if !is_valid {
            tracing::debug!(
                provider = %self.provider_id,
                received = %received,
                calculated = %calculated,
                "invalid webhook signature"
            );
        }

        is_valid
    }

    fn provider_id(&self) -> &str {
        &self.provider_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test_webhook_secret";

    fn validator() -> SignedPayloadValidator {
        SignedPayloadValidator::shufti_pro(SecretString::new(SECRET.to_string())).unwrap()
    }

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    fn expected_digest(text: &str) -> String {
        hex::encode(Sha256::digest(text.as_bytes()))
    }

    #[test]
    fn test_signature_covers_sorted_pairs_and_secret() {
        let map = payload(json!({"b": 2, "a": 1}));
        assert_eq!(
            validator().compute_signature(&map),
            expected_digest(&format!("a=1&b=2{}", SECRET))
        );
    }

    #[test]
    fn test_key_order_does_not_change_signature() {
        let first = payload(json!({"b": 2, "a": 1}));
        let second = payload(json!({"a": 1, "b": 2}));
        let validator = validator();
        assert_eq!(
            validator.compute_signature(&first),
            validator.compute_signature(&second)
        );
    }

    #[test]
    fn test_valid_signature() {
        let map = payload(json!({
            "reference": "SP_1",
            "event": "verification.accepted",
            "signature": "ignored"
        }));
        let validator = validator();
        let mut headers = HashMap::new();
        headers.insert(
            "X-ShuftiPro-Signature".to_string(),
            validator.compute_signature(&map),
        );

        assert!(validator.validate(&headers, &map));
    }

    #[test]
    fn test_tampered_payload_fails() {
        let map = payload(json!({"reference": "SP_1", "event": "verification.declined"}));
        let validator = validator();
        let mut headers = HashMap::new();
        headers.insert("Signature".to_string(), validator.compute_signature(&map));

        let tampered = payload(json!({"reference": "SP_1", "event": "verification.accepted"}));
        assert!(!validator.validate(&headers, &tampered));
    }

    #[test]
    fn test_missing_header_is_false() {
        let map = payload(json!({"reference": "SP_1"}));
        assert!(!validator().validate(&HashMap::new(), &map));
    }

    #[test]
    fn test_invalid_signature_is_false() {
        let map = payload(json!({"reference": "SP_1"}));
        let mut headers = HashMap::new();
        headers.insert("X-Webhook-Signature".to_string(), "invalid".to_string());
        assert!(!validator().validate(&headers, &map));
    }

    #[test]
    fn test_first_header_in_order_wins() {
        let map = payload(json!({"reference": "SP_1"}));
        let validator = validator();
        let mut headers = HashMap::new();
        headers.insert("Signature".to_string(), validator.compute_signature(&map));
        headers.insert("HTTP_X_SHUFTIPRO_SIGNATURE".to_string(), "stale".to_string());

        assert_eq!(validator.extract_signature(&headers), Some("stale"));
        assert!(!validator.validate(&headers, &map));
    }

    #[test]
    fn test_lowercased_header_is_found() {
        let map = payload(json!({"reference": "SP_1"}));
        let validator = validator();
        let mut headers = HashMap::new();
        headers.insert(
            "x-shuftipro-signature".to_string(),
            validator.compute_signature(&map),
        );

        assert!(validator.validate(&headers, &map));
    }

    #[test]
    fn test_empty_header_value_is_false() {
        let map = payload(json!({}));
        let validator = validator();
        let mut headers = HashMap::new();
        headers.insert("Signature".to_string(), String::new());
        assert!(!validator.validate(&headers, &map));
    }

    #[test]
    fn test_blank_secret_is_rejected() {
        let result = SignedPayloadValidator::shufti_pro(SecretString::new("   ".to_string()));
        let err = result.err().unwrap();
        assert_eq!(
            err.error_kind,
            crate::ErrorKind::Webhook(WebhookErrorKind::MissingSecret)
        );
    }
}
