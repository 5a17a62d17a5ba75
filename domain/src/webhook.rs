//! Inbound ShuftiPro webhooks.

use std::collections::HashMap;

use kyc_auth::webhook::{SignedPayloadValidator, WebhookValidator};
use log::*;
use secrecy::SecretString;
use serde_json::{json, Map, Value};
use service::config::Config;

use crate::activity::ActivityLogger;
use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use crate::verification::ShuftiProResponse;

pub struct WebhookService {
    validator: SignedPayloadValidator,
    signature_validation: bool,
    activity: ActivityLogger,
}

impl WebhookService {
    /// Fails when no webhook secret is configured, even if signature
    /// validation is switched off.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let secret = config.shuftipro_webhook_secret().unwrap_or_default();
        let validator = SignedPayloadValidator::shufti_pro(SecretString::new(secret))?;

        Ok(Self {
            validator,
            signature_validation: config.shuftipro_webhook_signature_validation,
            activity: ActivityLogger::new(config),
        })
    }

    /// Authenticate the webhook when validation is on, then normalize it.
    pub fn handle_webhook(
        &self,
        payload: Map<String, Value>,
        headers: &HashMap<String, String>,
    ) -> Result<ShuftiProResponse, Error> {
        self.activity
            .record("Webhook received", &Value::Object(payload.clone()));

        if self.signature_validation && !self.validate_signature(&payload, headers) {
            warn!(
                "Rejecting ShuftiPro webhook with invalid signature for {:?}",
                payload.get("reference")
            );
            return Err(Error {
                source: Some("Invalid webhook signature".into()),
                error_kind: DomainErrorKind::External(ExternalErrorKind::InvalidSignature),
            });
        }

        let response = ShuftiProResponse::from_payload(payload);
        debug!(
            "Accepted ShuftiPro webhook {} for {}",
            response.event, response.reference
        );
        Ok(response)
    }

    pub fn validate_signature(
        &self,
        payload: &Map<String, Value>,
        headers: &HashMap<String, String>,
    ) -> bool {
        let is_valid = self.validator.validate(headers, payload);
        if !is_valid {
            let header_names: Vec<&String> = headers.keys().collect();
            self.activity.record(
                "Webhook signature rejected",
                &json!({"headers": header_names}),
            );
        }
        is_valid
    }
}
