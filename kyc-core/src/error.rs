//! Error types for KYC driver operations.

use std::fmt;

/// Universal error type that abstracts provider-specific errors into common variants.
///
/// Every driver maps its native errors to these variants so callers can handle
/// failures the same way regardless of which provider produced them.
#[derive(Debug)]
pub enum Error {
    /// Credential or webhook signature failures. For webhooks this means the
    /// payload could not be attributed to the provider and must be rejected.
    Authentication(String),

    /// Network connectivity issues, DNS failures, or connection timeouts.
    Network(String),

    /// Missing credentials, secrets, or malformed settings.
    /// Raised when a driver is constructed, never deferred to the first call.
    Configuration(String),

    /// The provider answered with a non-success status. The message carries the
    /// operation, the reference when known, and the HTTP status and body.
    Provider(String),

    /// Document storage backend failures.
    Storage(String),

    /// Failed to serialize data to JSON.
    Serialization(String),

    /// Failed to deserialize a provider payload.
    Deserialization(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            Error::Deserialization(err.to_string())
        } else {
            Error::Serialization(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = Error::Provider("retrieve_verification SP_1: HTTP 500 - boom".to_string());
        assert_eq!(
            err.to_string(),
            "Provider error: retrieve_verification SP_1: HTTP 500 - boom"
        );
    }

    #[test]
    fn test_json_syntax_error_maps_to_deserialization() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Deserialization(_)));
    }
}
