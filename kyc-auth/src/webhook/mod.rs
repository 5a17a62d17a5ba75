//! Webhook signature validation.

mod canonical;
mod signed_payload;

pub use canonical::{signing_string, to_signing_json};
pub use signed_payload::{SignedPayloadValidator, SHUFTI_PRO_SIGNATURE_HEADERS};

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Trait for validating webhook signatures.
pub trait WebhookValidator: Send + Sync {
    /// Validate a webhook request.
    ///
    /// # Arguments
    ///
    /// * `headers` - HTTP headers from the webhook request
    /// * `payload` - Decoded JSON body
    ///
    /// # Returns
    ///
    /// `true` if the signature is present and matches, `false` otherwise.
    fn validate(&self, headers: &HashMap<String, String>, payload: &Map<String, Value>) -> bool;

    /// Get the provider identifier for this validator.
    fn provider_id(&self) -> &str;
}
