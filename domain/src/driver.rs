//! The ShuftiPro implementation of the KYC [`Driver`] trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kyc_core::traits::driver::Driver;
use kyc_core::{
    Capabilities, SimpleVerificationOptions, User, VerificationRequest, VerificationResult,
    VerificationStatus,
};
use log::*;
use serde_json::{Map, Value};
use service::config::{Config, DRIVER_NAME};

use crate::documents::DocumentService;
use crate::error::Error;
use crate::gateway::shufti_pro::{ShuftiProClient, VerificationApi};
use crate::storage::{DocumentStorage, LocalDiskStorage};
use crate::verification;
use crate::webhook::WebhookService;

pub struct ShuftiProDriver {
    api: Arc<dyn VerificationApi>,
    documents: DocumentService,
    webhooks: WebhookService,
    enabled: bool,
    journeys_enabled: bool,
    default_journey_id: Option<String>,
    default_language: String,
}

impl ShuftiProDriver {
    /// Driver talking to the configured ShuftiPro endpoint and storing
    /// documents on local disk.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let api = Arc::new(ShuftiProClient::new(config)?);
        let storage = Arc::new(LocalDiskStorage::new(
            config.shuftipro_document_storage_root(),
        ));
        Self::with_components(config, api, storage)
    }

    pub fn with_components(
        config: &Config,
        api: Arc<dyn VerificationApi>,
        storage: Arc<dyn DocumentStorage>,
    ) -> Result<Self, Error> {
        let documents = DocumentService::new(config, Arc::clone(&api), storage)?;
        let webhooks = WebhookService::new(config)?;

        Ok(Self {
            api,
            documents,
            webhooks,
            enabled: config.kyc_shuftipro_enabled,
            journeys_enabled: config.shuftipro_journeys_enabled,
            default_journey_id: config.shuftipro_default_journey_id(),
            default_language: config.shuftipro_default_language().to_string(),
        })
    }

    pub fn documents(&self) -> &DocumentService {
        &self.documents
    }
}

/// Collapse a failed lookup into `default` for the operations that never fail.
fn or_default<T>(operation: &str, reference: &str, result: Result<T, Error>, default: T) -> T {
    result.unwrap_or_else(|e| {
        debug!("{} for {} failed, returning default: {}", operation, reference, e);
        default
    })
}

#[async_trait]
impl Driver for ShuftiProDriver {
    async fn create_verification(
        &self,
        _user: &User,
        request: VerificationRequest,
    ) -> Result<VerificationResult, kyc_core::Error> {
        let response = self.api.create_verification(request.into()).await?;
        Ok(response.into())
    }

    async fn create_simple_verification(
        &self,
        user: &User,
        options: SimpleVerificationOptions,
    ) -> Result<VerificationResult, kyc_core::Error> {
        let country = options.country.unwrap_or_default();
        let language = options
            .language
            .unwrap_or_else(|| self.default_language.clone());

        let journey_id = self
            .default_journey_id
            .as_deref()
            .filter(|_| self.journeys_enabled);

        let response = match journey_id {
            Some(journey_id) => {
                debug!("Starting ShuftiPro journey {} for {}", journey_id, user.id);
                self.api
                    .create_journey_verification(&user.email, &country, &language, journey_id)
                    .await?
            }
            None => {
                debug!("Starting simple ShuftiPro verification for {}", user.id);
                self.api
                    .create_simple_verification(&user.email, &country)
                    .await?
            }
        };

        Ok(response.into())
    }

    async fn retrieve_verification(
        &self,
        reference: &str,
    ) -> Result<VerificationResult, kyc_core::Error> {
        let response = self.api.retrieve_verification(reference, true).await?;
        Ok(response.into())
    }

    async fn can_resume_verification(&self, reference: &str) -> bool {
        let result = self
            .api
            .retrieve_verification(reference, false)
            .await
            .map(|response| response.is_pending());
        or_default("can_resume_verification", reference, result, false)
    }

    async fn get_verification_url(&self, reference: &str) -> Option<String> {
        let result = self
            .api
            .retrieve_verification(reference, false)
            .await
            .map(|response| response.verification_url);
        or_default("get_verification_url", reference, result, None)
    }

    async fn process_webhook(
        &self,
        payload: Map<String, Value>,
        headers: &HashMap<String, String>,
    ) -> Result<VerificationResult, kyc_core::Error> {
        let response = self.webhooks.handle_webhook(payload, headers)?;
        Ok(response.into())
    }

    fn validate_webhook_signature(
        &self,
        payload: &Map<String, Value>,
        headers: &HashMap<String, String>,
    ) -> bool {
        self.webhooks.validate_signature(payload, headers)
    }

    async fn download_documents(
        &self,
        user: &User,
        reference: &str,
    ) -> Result<Vec<String>, kyc_core::Error> {
        Ok(self
            .documents
            .download_and_store_documents(user, reference)
            .await?)
    }

    fn map_event_to_status(&self, event: &str) -> VerificationStatus {
        verification::map_event_to_status(event)
    }

    fn name(&self) -> &str {
        DRIVER_NAME
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            document_verification: true,
            face_verification: true,
            webhook_callbacks: true,
            document_download: true,
        }
    }
}
