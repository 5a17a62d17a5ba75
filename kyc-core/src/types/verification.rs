//! Types for identity-verification operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Abstract lifecycle status of a verification.
///
/// Drivers derive this from the provider's raw event name. Events a driver does
/// not recognize map to `InProgress`, so `InProgress` alone is not proof that a
/// verification is actively being worked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    RequestPending,
    InProgress,
    ReviewPending,
    Completed,
    VerificationCompleted,
    VerificationFailed,
    Rejected,
    VerificationCancelled,
    RequestTimeout,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::RequestPending => "request_pending",
            VerificationStatus::InProgress => "in_progress",
            VerificationStatus::ReviewPending => "review_pending",
            VerificationStatus::Completed => "completed",
            VerificationStatus::VerificationCompleted => "verification_completed",
            VerificationStatus::VerificationFailed => "verification_failed",
            VerificationStatus::Rejected => "rejected",
            VerificationStatus::VerificationCancelled => "verification_cancelled",
            VerificationStatus::RequestTimeout => "request_timeout",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The person a verification is created for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Options accepted by the minimal "just verify this user" entry point.
#[derive(Debug, Clone, Default)]
pub struct SimpleVerificationOptions {
    pub country: Option<String>,
    pub language: Option<String>,
}

/// Provider-agnostic verification request.
///
/// Values are fixed once built; the `with_*` methods consume the request and
/// return the updated copy. When `reference` is left empty the driver generates
/// one before submission.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRequest {
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

impl VerificationRequest {
    /// Start a request for `email` with no country restriction and English UI.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            country: String::new(),
            language: "en".to_string(),
            redirect_url: None,
            callback_url: None,
            reference: None,
            journey_id: None,
            allowed_countries: None,
            denied_countries: None,
            additional_data: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_journey_id(mut self, journey_id: impl Into<String>) -> Self {
        self.journey_id = Some(journey_id.into());
        self
    }

    pub fn with_allowed_countries(mut self, countries: Vec<String>) -> Self {
        self.allowed_countries = Some(countries);
        self
    }

    pub fn with_denied_countries(mut self, countries: Vec<String>) -> Self {
        self.denied_countries = Some(countries);
        self
    }

    /// Extra top-level keys for the provider request body.
    ///
    /// These are merged last, so a key that collides with a built-in field
    /// replaces it.
    pub fn with_additional_data(mut self, data: Map<String, Value>) -> Self {
        self.additional_data = Some(data);
        self
    }
}

/// Normalized verification result returned by every driver operation.
///
/// `raw_payload` holds the provider payload exactly as received; it is never
/// a serialized copy of another result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub reference: String,
    pub event: String,
    pub success: bool,
    pub verification_url: Option<String>,
    pub extracted_data: Option<Value>,
    pub verification_results: Option<Value>,
    #[serde(rename = "document_images")]
    pub document_image_urls: Option<Vec<String>>,
    #[serde(rename = "verification_video")]
    pub verification_video_url: Option<String>,
    #[serde(rename = "verification_report")]
    pub verification_report_url: Option<String>,
    pub image_access_token: Option<String>,
    pub country: Option<String>,
    pub duplicate_detected: Option<bool>,
    pub decline_reason: Option<String>,
    #[serde(rename = "raw_response")]
    pub raw_payload: Map<String, Value>,
    pub message: Option<String>,
}

/// Feature flags a driver advertises to the abstraction layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub document_verification: bool,
    pub face_verification: bool,
    pub webhook_callbacks: bool,
    pub document_download: bool,
}
