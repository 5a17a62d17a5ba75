//! ShuftiPro API client for creating and looking up verifications.
//!
//! Requests go to the ShuftiPro REST API with HTTP Basic authentication (client
//! id and secret key). Replies are normalized into [`ShuftiProResponse`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use kyc_auth::credentials::{BasicAuth, Provider};
use kyc_auth::http::{AuthenticatedClient, AuthenticatedClientBuilder, HttpResponse};
use kyc_auth::providers::{shufti_pro_config, ProviderConfig};
use kyc_core::VerificationRequest;
use log::*;
use secrecy::SecretString;
use serde_json::{json, Map, Value};
use service::config::Config;

use crate::activity::ActivityLogger;
use crate::error::Error;
use crate::verification::ShuftiProResponse;

/// Document types ShuftiPro is asked to accept.
const SUPPORTED_DOCUMENT_TYPES: [&str; 3] = ["passport", "id_card", "driving_license"];

/// Verification request in ShuftiPro terms.
#[derive(Debug, Clone, PartialEq)]
pub struct ShuftiProRequest {
    pub email: String,
    pub country: String,
    pub language: String,
    pub redirect_url: Option<String>,
    pub callback_url: Option<String>,
    pub reference: Option<String>,
    pub journey_id: Option<String>,
    pub allowed_countries: Option<Vec<String>>,
    pub denied_countries: Option<Vec<String>>,
    pub additional_data: Option<Map<String, Value>>,
}

impl ShuftiProRequest {
    pub fn new(email: impl Into<String>) -> Self {
        VerificationRequest::new(email).into()
    }
}

impl From<VerificationRequest> for ShuftiProRequest {
    fn from(request: VerificationRequest) -> Self {
        Self {
            email: request.email,
            country: request.country,
            language: request.language,
            redirect_url: request.redirect_url,
            callback_url: request.callback_url,
            reference: request.reference,
            journey_id: request.journey_id,
            allowed_countries: request.allowed_countries,
            denied_countries: request.denied_countries,
            additional_data: request.additional_data,
        }
    }
}

/// Operations the driver needs from the ShuftiPro API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationApi: Send + Sync {
    /// Submit a verification built field by field from `request`.
    async fn create_verification(
        &self,
        request: ShuftiProRequest,
    ) -> Result<ShuftiProResponse, Error>;

    /// Start a document + face verification with the configured URLs.
    async fn create_simple_verification(
        &self,
        email: &str,
        country: &str,
    ) -> Result<ShuftiProResponse, Error>;

    /// Start a pre-configured ShuftiPro journey.
    async fn create_journey_verification(
        &self,
        email: &str,
        country: &str,
        language: &str,
        journey_id: &str,
    ) -> Result<ShuftiProResponse, Error>;

    /// Look up a verification, optionally with its document image URLs.
    async fn retrieve_verification(
        &self,
        reference: &str,
        with_images: bool,
    ) -> Result<ShuftiProResponse, Error>;
}

/// reqwest-backed ShuftiPro client.
pub struct ShuftiProClient {
    client: AuthenticatedClient,
    provider: ProviderConfig,
    callback_url: Option<String>,
    redirect_url: Option<String>,
    activity: ActivityLogger,
}

impl ShuftiProClient {
    /// Build a client from configuration. Fails when the client id or the
    /// secret key is missing.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let (Some(client_id), Some(secret_key)) = (
            config.shuftipro_client_id().filter(|id| !id.trim().is_empty()),
            config.shuftipro_secret_key().filter(|key| !key.trim().is_empty()),
        ) else {
            warn!("ShuftiPro API credentials are not configured");
            return Err(Error::config("ShuftiPro API credentials are not configured"));
        };

        let auth = BasicAuth::new(Provider::ShuftiPro, &client_id, SecretString::new(secret_key))?;

        let client = AuthenticatedClientBuilder::new()
            .with_auth(Box::new(auth))
            .with_timeout(Duration::from_secs(config.shuftipro_timeout))
            .build()?;

        Ok(Self {
            client,
            provider: shufti_pro_config(config.shuftipro_base_url()),
            callback_url: config.shuftipro_callback_url(),
            redirect_url: config.shuftipro_redirect_url(),
            activity: ActivityLogger::new(config),
        })
    }

    /// Assemble the JSON body for a create call.
    ///
    /// Keys are emitted in a fixed order; `additional_data` is merged last and
    /// replaces any built-in key it shares a name with.
    pub fn build_payload(&self, request: &ShuftiProRequest) -> Map<String, Value> {
        let reference = request
            .reference
            .clone()
            .unwrap_or_else(generate_reference);
        let with_reference = |url: Option<&String>| match url {
            Some(url) => Value::String(with_query_param(url, "reference", &reference)),
            None => Value::Null,
        };

        let mut payload = Map::new();
        payload.insert("reference".to_string(), json!(reference));
        payload.insert("email".to_string(), json!(request.email));
        payload.insert("country".to_string(), json!(request.country));
        payload.insert("language".to_string(), json!(request.language));
        payload.insert(
            "callback_url".to_string(),
            with_reference(request.callback_url.as_ref().or(self.callback_url.as_ref())),
        );
        payload.insert(
            "redirect_url".to_string(),
            with_reference(request.redirect_url.as_ref().or(self.redirect_url.as_ref())),
        );
        payload.insert("face".to_string(), json!({}));
        payload.insert(
            "document".to_string(),
            json!({ "supported_types": SUPPORTED_DOCUMENT_TYPES }),
        );

        if let Some(journey_id) = request.journey_id.as_ref().filter(|id| !id.is_empty()) {
            payload.insert("journey_id".to_string(), json!(journey_id));
        }
        if let Some(countries) = request.allowed_countries.as_ref().filter(|c| !c.is_empty()) {
            payload.insert("allowed_countries".to_string(), json!(countries));
        }
        if let Some(countries) = request.denied_countries.as_ref().filter(|c| !c.is_empty()) {
            payload.insert("denied_countries".to_string(), json!(countries));
        }
        if let Some(additional) = &request.additional_data {
            for (key, value) in additional {
                payload.insert(key.clone(), value.clone());
            }
        }

        payload
    }

    /// Request with a fresh reference and the configured URLs, the redirect
    /// tagged with which entry point created it.
    fn configured_request(&self, email: &str, country: &str, flow: &str) -> ShuftiProRequest {
        let reference = generate_reference();
        let redirect_url = self.redirect_url.as_ref().map(|url| {
            with_query_param(&with_query_param(url, "reference", &reference), "type", flow)
        });

        ShuftiProRequest {
            country: country.to_string(),
            reference: Some(reference),
            callback_url: self.callback_url.clone(),
            redirect_url,
            ..ShuftiProRequest::new(email)
        }
    }

    async fn post(
        &self,
        operation: &str,
        reference: &str,
        url: &str,
        body: &Map<String, Value>,
    ) -> Result<ShuftiProResponse, Error> {
        let response = self.client.post_json(url, body).await.map_err(|e| {
            warn!("ShuftiPro {} request failed for {}: {}", operation, reference, e);
            Error::from(e)
        })?;

        self.activity.record(
            "API Response",
            &json!({
                "operation": operation,
                "status": response.status.as_u16(),
                "headers": response.headers,
                "body": response.text(),
            }),
        );

        parse_response(operation, reference, response)
    }
}

fn parse_response(
    operation: &str,
    reference: &str,
    response: HttpResponse,
) -> Result<ShuftiProResponse, Error> {
    // Redirect statuses are accepted like success ones.
    if !(response.status.is_success() || response.status.is_redirection()) {
        let body = response.text();
        warn!(
            "ShuftiPro {} failed for {}: HTTP {} - {}",
            operation,
            reference,
            response.status.as_u16(),
            body
        );
        return Err(Error::http(
            operation,
            Some(reference),
            response.status.as_u16(),
            body,
        ));
    }

    let payload: Map<String, Value> = response.json().map_err(|e| {
        warn!("Failed to parse ShuftiPro {} response: {:?}", operation, e);
        Error::from(e)
    })?;

    Ok(ShuftiProResponse::from_payload(payload))
}

#[async_trait]
impl VerificationApi for ShuftiProClient {
    async fn create_verification(
        &self,
        request: ShuftiProRequest,
    ) -> Result<ShuftiProResponse, Error> {
        let payload = self.build_payload(&request);
        let reference = payload
            .get("reference")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        debug!("Creating ShuftiPro verification {}", reference);
        self.activity
            .record("Creating verification request", &Value::Object(payload.clone()));

        let response = self
            .post(
                "create_verification",
                &reference,
                &self.provider.base_url,
                &payload,
            )
            .await?;

        self.activity.record(
            "Verification request response",
            &Value::Object(response.raw_payload.clone()),
        );
        info!(
            "Created ShuftiPro verification {} ({})",
            response.reference, response.event
        );
        Ok(response)
    }

    async fn create_simple_verification(
        &self,
        email: &str,
        country: &str,
    ) -> Result<ShuftiProResponse, Error> {
        let request = self.configured_request(email, country, "simple");
        self.create_verification(request).await
    }

    async fn create_journey_verification(
        &self,
        email: &str,
        country: &str,
        language: &str,
        journey_id: &str,
    ) -> Result<ShuftiProResponse, Error> {
        let request = ShuftiProRequest {
            language: language.to_string(),
            journey_id: Some(journey_id.to_string()),
            ..self.configured_request(email, country, "journey")
        };
        self.create_verification(request).await
    }

    async fn retrieve_verification(
        &self,
        reference: &str,
        with_images: bool,
    ) -> Result<ShuftiProResponse, Error> {
        self.activity.record(
            "Retrieving verification data",
            &json!({"reference": reference, "with_images": with_images}),
        );

        let mut body = Map::new();
        body.insert("reference".to_string(), json!(reference));
        if with_images {
            body.insert("get_images".to_string(), json!(1));
        }

        let response = self
            .post(
                "retrieve_verification",
                reference,
                &self.provider.status_url,
                &body,
            )
            .await?;

        self.activity.record(
            "Verification status response",
            &Value::Object(response.raw_payload.clone()),
        );
        Ok(response)
    }
}

/// New unique reference of the form `SP_<unix seconds>_<13 hex chars>`.
pub fn generate_reference() -> String {
    let unique = uuid::Uuid::new_v4().simple().to_string();
    format!("SP_{}_{}", Utc::now().timestamp(), &unique[..13])
}

/// Append `name=value` to the query of `url`.
///
/// Uses `&` when the URL already has a query and `?` otherwise, keeps any
/// `#fragment` at the end, and leaves the URL untouched when the parameter is
/// already present.
pub fn with_query_param(url: &str, name: &str, value: &str) -> String {
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };

    let already_present = base
        .split_once('?')
        .map(|(_, query)| {
            query
                .split('&')
                .any(|pair| pair.split('=').next() == Some(name))
        })
        .unwrap_or(false);
    if already_present {
        return url.to_string();
    }

    let separator = if base.contains('?') { '&' } else { '?' };
    let mut result = format!(
        "{}{}{}={}",
        base,
        separator,
        name,
        urlencoding::encode(value)
    );
    if let Some(fragment) = fragment {
        result.push('#');
        result.push_str(fragment);
    }
    result
}
