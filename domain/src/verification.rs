//! Normalized ShuftiPro verification responses and event mapping.
//!
//! API replies and webhook bodies share one shape, so both are parsed here.

use kyc_core::{VerificationResult, VerificationStatus};
use log::*;
use serde::Serialize;
use serde_json::{Map, Value};

/// Document type used for entries of an array-shaped `document_images` field.
pub const DOCUMENT_IMAGE: &str = "document_image";
pub const VERIFICATION_VIDEO: &str = "verification_video";
pub const VERIFICATION_REPORT: &str = "verification_report";

/// A ShuftiPro payload with its well-known fields lifted out.
///
/// Fields are copied from the payload without shape validation: a field that
/// is absent, `null` or of an unexpected JSON type is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShuftiProResponse {
    pub reference: String,
    pub event: String,
    pub success: bool,
    pub verification_url: Option<String>,
    pub extracted_data: Option<Value>,
    pub verification_results: Option<Value>,
    pub document_images: Option<Value>,
    pub verification_video: Option<String>,
    pub verification_report: Option<String>,
    pub image_access_token: Option<String>,
    pub country: Option<String>,
    pub duplicate_detected: Option<bool>,
    pub decline_reason: Option<String>,
    #[serde(rename = "raw_response")]
    pub raw_payload: Map<String, Value>,
    pub message: Option<String>,
}

/// One downloadable file referenced by a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUrl {
    pub document_type: String,
    /// Position within a list of documents of the same type, 0 for single ones.
    pub index: usize,
    pub url: String,
}

impl ShuftiProResponse {
    pub fn from_payload(payload: Map<String, Value>) -> Self {
        let text = |key: &str| payload.get(key).and_then(Value::as_str).map(str::to_string);
        let structured = |key: &str| {
            payload
                .get(key)
                .filter(|value| value.is_object() || value.is_array())
                .cloned()
        };

        // Only the nested result event counts; the top-level event does not.
        let success = payload
            .get("result")
            .and_then(|result| result.get("event"))
            .and_then(Value::as_str)
            == Some("verification.completed");

        Self {
            reference: text("reference").unwrap_or_default(),
            event: text("event").unwrap_or_else(|| "unknown".to_string()),
            success,
            verification_url: text("verification_url"),
            extracted_data: structured("extracted_data"),
            verification_results: structured("verification_results"),
            document_images: structured("document_images"),
            verification_video: text("verification_video"),
            verification_report: text("verification_report"),
            image_access_token: text("image_access_token"),
            country: text("country"),
            duplicate_detected: payload.get("duplicate_detected").and_then(Value::as_bool),
            decline_reason: text("decline_reason"),
            message: text("message"),
            raw_payload: payload,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.success
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self.event.as_str(),
            "request.pending" | "verification.pending"
        )
    }

    pub fn is_completed(&self) -> bool {
        matches!(
            self.event.as_str(),
            "verification.completed" | "verification.approved"
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(
            self.event.as_str(),
            "verification.failed" | "verification.declined"
        )
    }

    /// Every document image URL, in provider order.
    pub fn document_image_urls(&self) -> Option<Vec<String>> {
        self.document_images
            .as_ref()
            .map(|images| image_entries(images).into_iter().map(|doc| doc.url).collect())
    }

    /// Every downloadable file: document images first, then the video and the report.
    pub fn document_urls(&self) -> Vec<DocumentUrl> {
        let mut documents = self
            .document_images
            .as_ref()
            .map(image_entries)
            .unwrap_or_default();

        for (document_type, url) in [
            (VERIFICATION_VIDEO, &self.verification_video),
            (VERIFICATION_REPORT, &self.verification_report),
        ] {
            if let Some(url) = url.as_ref().filter(|url| !url.is_empty()) {
                documents.push(DocumentUrl {
                    document_type: document_type.to_string(),
                    index: 0,
                    url: url.clone(),
                });
            }
        }

        documents
    }
}

/// `document_images` comes either as a list of URLs or as an object keyed by
/// document type whose values are a URL or a list of URLs.
fn image_entries(images: &Value) -> Vec<DocumentUrl> {
    match images {
        Value::Array(urls) => url_list(DOCUMENT_IMAGE, urls),
        Value::Object(by_type) => by_type
            .iter()
            .flat_map(|(document_type, value)| match value {
                Value::String(url) if !url.is_empty() => vec![DocumentUrl {
                    document_type: document_type.clone(),
                    index: 0,
                    url: url.clone(),
                }],
                Value::Array(urls) => url_list(document_type, urls),
                _ => Vec::new(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn url_list(document_type: &str, urls: &[Value]) -> Vec<DocumentUrl> {
    urls.iter()
        .enumerate()
        .filter_map(|(index, url)| {
            url.as_str()
                .filter(|url| !url.is_empty())
                .map(|url| DocumentUrl {
                    document_type: document_type.to_string(),
                    index,
                    url: url.to_string(),
                })
        })
        .collect()
}

impl From<ShuftiProResponse> for VerificationResult {
    fn from(response: ShuftiProResponse) -> Self {
        let document_image_urls = response.document_image_urls();

        VerificationResult {
            reference: response.reference,
            event: response.event,
            success: response.success,
            verification_url: response.verification_url,
            extracted_data: response.extracted_data,
            verification_results: response.verification_results,
            document_image_urls,
            verification_video_url: response.verification_video,
            verification_report_url: response.verification_report,
            image_access_token: response.image_access_token,
            country: response.country,
            duplicate_detected: response.duplicate_detected,
            decline_reason: response.decline_reason,
            raw_payload: response.raw_payload,
            message: response.message,
        }
    }
}

/// Map a raw ShuftiPro event name to the abstract status.
///
/// Events not in the table map to `InProgress`.
pub fn map_event_to_status(event: &str) -> VerificationStatus {
    match event {
        "request.pending" => VerificationStatus::RequestPending,
        "verification.pending" | "verification.in_progress" => VerificationStatus::InProgress,
        "verification.review_pending" => VerificationStatus::ReviewPending,
        "verification.completed" | "verification.approved" => VerificationStatus::Completed,
        "verification.accepted" => VerificationStatus::VerificationCompleted,
        "verification.failed" => VerificationStatus::VerificationFailed,
        "verification.declined" => VerificationStatus::Rejected,
        "verification.cancelled" => VerificationStatus::VerificationCancelled,
        "request.timeout" => VerificationStatus::RequestTimeout,
        unknown => {
            warn!("Unknown ShuftiPro event {unknown:?}, treating it as in progress");
            VerificationStatus::InProgress
        }
    }
}
