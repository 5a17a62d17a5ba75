//! HTTP Basic authentication.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

use super::{Provider, ProviderAuth};
use crate::error::{credential_error, CredentialErrorKind, Error};

/// HTTP Basic authentication with a client id and secret key.
///
/// Both values are required; a blank value is rejected when the credentials are
/// built rather than surfacing later as a 401 from the provider.
pub struct BasicAuth {
    provider: Provider,
    client_id: String,
    secret_key: SecretString,
}

impl BasicAuth {
    /// Create new Basic credentials.
    ///
    /// # Arguments
    ///
    /// * `provider` - The verification provider
    /// * `client_id` - Account identifier, sent as the user name
    /// * `secret_key` - Account secret, sent as the password
    pub fn new(
        provider: Provider,
        client_id: &str,
        secret_key: SecretString,
    ) -> Result<Self, Error> {
        if client_id.trim().is_empty() {
            return Err(credential_error(
                CredentialErrorKind::MissingClientId,
                &format!("{} client id is not configured", provider.as_str()),
            ));
        }
        if secret_key.expose_secret().trim().is_empty() {
            return Err(credential_error(
                CredentialErrorKind::MissingSecretKey,
                &format!("{} secret key is not configured", provider.as_str()),
            ));
        }

        Ok(Self {
            provider,
            client_id: client_id.to_string(),
            secret_key,
        })
    }

    /// Get the client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl ProviderAuth for BasicAuth {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.client_id, Some(self.secret_key.expose_secret()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_creation() {
        let auth = BasicAuth::new(
            Provider::ShuftiPro,
            "client_123",
            SecretString::new("secret_456".to_string()),
        )
        .unwrap();

        assert_eq!(auth.provider(), Provider::ShuftiPro);
        assert_eq!(auth.client_id(), "client_123");
    }

    #[test]
    fn test_blank_client_id_is_rejected() {
        let result = BasicAuth::new(
            Provider::ShuftiPro,
            "  ",
            SecretString::new("secret_456".to_string()),
        );

        let err = result.err().unwrap();
        assert_eq!(
            err.error_kind,
            crate::ErrorKind::Credential(CredentialErrorKind::MissingClientId)
        );
    }

    #[test]
    fn test_blank_secret_key_is_rejected() {
        let result = BasicAuth::new(
            Provider::ShuftiPro,
            "client_123",
            SecretString::new(String::new()),
        );

        let err = result.err().unwrap();
        assert_eq!(
            err.error_kind,
            crate::ErrorKind::Credential(CredentialErrorKind::MissingSecretKey)
        );
    }
}
