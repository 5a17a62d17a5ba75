//! KYC driver trait.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::types::verification::{
    Capabilities, SimpleVerificationOptions, User, VerificationRequest, VerificationResult,
    VerificationStatus,
};
use crate::Error;

/// Abstraction for identity-verification providers.
///
/// Implementations translate the generic request into the provider's wire
/// format, call the provider, and normalize whatever comes back (API replies and
/// webhook bodies alike) into a [`VerificationResult`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Driver: Send + Sync {
    /// Start a verification described field by field by `request`.
    async fn create_verification(
        &self,
        user: &User,
        request: VerificationRequest,
    ) -> std::result::Result<VerificationResult, Error>;

    /// Start a verification for `user` using the driver's configured defaults.
    ///
    /// Drivers that support pre-configured provider flows pick one here when
    /// their configuration says so.
    async fn create_simple_verification(
        &self,
        user: &User,
        options: SimpleVerificationOptions,
    ) -> std::result::Result<VerificationResult, Error>;

    /// Fetch the current state of a verification, including document images.
    async fn retrieve_verification(
        &self,
        reference: &str,
    ) -> std::result::Result<VerificationResult, Error>;

    /// Whether the user can still continue the verification flow.
    ///
    /// Never fails: any provider or transport error yields `false`.
    async fn can_resume_verification(&self, reference: &str) -> bool;

    /// The provider-hosted URL for an ongoing verification.
    ///
    /// Never fails: any provider or transport error yields `None`.
    async fn get_verification_url(&self, reference: &str) -> Option<String>;

    /// Authenticate (when enabled) and normalize an inbound webhook.
    async fn process_webhook(
        &self,
        payload: Map<String, Value>,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<VerificationResult, Error>;

    /// Check a webhook signature without normalizing the payload.
    fn validate_webhook_signature(
        &self,
        payload: &Map<String, Value>,
        headers: &HashMap<String, String>,
    ) -> bool;

    /// Download the verification documents and store them, returning the
    /// stored paths in provider order.
    async fn download_documents(
        &self,
        user: &User,
        reference: &str,
    ) -> std::result::Result<Vec<String>, Error>;

    /// Map a raw provider event name to the abstract status.
    fn map_event_to_status(&self, event: &str) -> VerificationStatus;

    /// Return unique identifier for this driver (e.g., "shuftipro").
    fn name(&self) -> &str;

    /// Whether the driver is switched on in configuration.
    fn is_enabled(&self) -> bool;

    /// Features supported by this driver.
    fn capabilities(&self) -> Capabilities;
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn resume_or_restart(driver: &dyn Driver, reference: &str) -> Option<String> {
        if driver.can_resume_verification(reference).await {
            driver.get_verification_url(reference).await
        } else {
            None
        }
    }

    #[tokio::test]
    async fn test_callers_work_through_trait_objects() {
        let mut driver = MockDriver::new();
        driver
            .expect_can_resume_verification()
            .returning(|reference| reference == "SP_1");
        driver
            .expect_get_verification_url()
            .returning(|reference| Some(format!("https://verify.test/{}", reference)));

        let driver: Box<dyn Driver> = Box::new(driver);
        assert_eq!(
            resume_or_restart(driver.as_ref(), "SP_1").await.as_deref(),
            Some("https://verify.test/SP_1")
        );
        assert_eq!(resume_or_restart(driver.as_ref(), "SP_2").await, None);
    }
}
