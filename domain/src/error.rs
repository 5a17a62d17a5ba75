//! Error types for the `domain` layer.
use kyc_auth::error::{Error as KycAuthError, ErrorKind as KycAuthErrorKind, WebhookErrorKind};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure with
/// `domain::error::Error` as the root type holding a tree of `error_kind` enums
/// that represent the kinds of errors that can occur in the domain layer or in
/// lower layers (`kyc-auth`). The `source` field holds the original error.
/// At the driver boundary the tree is flattened into `kyc_core::Error`, which
/// is the only error type applications see.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// Missing or blank credentials and secrets.
    Config,
    Storage,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// ShuftiPro answered with a status outside 2xx/3xx.
    Http {
        operation: String,
        reference: Option<String>,
        status: u16,
        body: String,
    },
    /// A webhook whose signature did not match the payload.
    InvalidSignature,
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl Error {
    pub(crate) fn config(message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    }

    pub(crate) fn http(
        operation: &str,
        reference: Option<&str>,
        status: u16,
        body: String,
    ) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Http {
                operation: operation.to_string(),
                reference: reference.map(str::to_string),
                status,
                body,
            }),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Storage),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                "Invalid JSON from ShuftiPro".to_string(),
            )),
        }
    }
}

// This is where we translate errors from the `kyc-auth` layer to the `domain` layer.
impl From<KycAuthError> for Error {
    fn from(err: KycAuthError) -> Self {
        let error_kind = match &err.error_kind {
            KycAuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            KycAuthErrorKind::Credential(_) | KycAuthErrorKind::Webhook(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Config)
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

// This is where the domain tree is flattened for callers of the `Driver` trait.
impl From<Error> for kyc_core::Error {
    fn from(err: Error) -> Self {
        let detail = err
            .source
            .as_ref()
            .map(|source| source.to_string())
            .unwrap_or_default();

        match err.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Config) => {
                kyc_core::Error::Configuration(detail)
            }
            DomainErrorKind::Internal(InternalErrorKind::Storage) => {
                kyc_core::Error::Storage(detail)
            }
            DomainErrorKind::Internal(InternalErrorKind::Other(message)) => {
                kyc_core::Error::Other(format!("{message}: {detail}").into())
            }
            DomainErrorKind::External(ExternalErrorKind::Network) => {
                kyc_core::Error::Network(detail)
            }
            DomainErrorKind::External(ExternalErrorKind::Http {
                operation,
                reference,
                status,
                body,
            }) => {
                let target = reference
                    .map(|reference| format!(" {reference}"))
                    .unwrap_or_default();
                kyc_core::Error::Provider(format!("{operation}{target}: HTTP {status} - {body}"))
            }
            DomainErrorKind::External(ExternalErrorKind::InvalidSignature) => {
                kyc_core::Error::Authentication("Invalid webhook signature".to_string())
            }
            DomainErrorKind::External(ExternalErrorKind::Other(message)) => {
                kyc_core::Error::Deserialization(format!("{message}: {detail}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_flattens_to_provider_error() {
        let err = Error::http(
            "create_verification",
            Some("SP_1"),
            500,
            "Internal Server Error".to_string(),
        );
        let core: kyc_core::Error = err.into();
        assert_eq!(
            core.to_string(),
            "Provider error: create_verification SP_1: HTTP 500 - Internal Server Error"
        );
    }

    #[test]
    fn test_config_error_flattens_to_configuration() {
        let err = Error::config("ShuftiPro API credentials are not configured");
        let core: kyc_core::Error = err.into();
        assert!(matches!(
            core,
            kyc_core::Error::Configuration(ref msg)
                if msg == "ShuftiPro API credentials are not configured"
        ));
    }

    #[test]
    fn test_invalid_signature_flattens_to_authentication() {
        let err = Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::InvalidSignature),
        };
        let core: kyc_core::Error = err.into();
        assert!(matches!(core, kyc_core::Error::Authentication(_)));
    }

    #[test]
    fn test_missing_webhook_secret_is_config_error() {
        let auth_err = kyc_auth::error::webhook_error(WebhookErrorKind::MissingSecret, "missing");
        let err: Error = auth_err.into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
    }
}
