//! Downloading ShuftiPro verification documents into storage.

use std::sync::Arc;
use std::time::Duration;

use kyc_auth::http::{AuthenticatedClient, AuthenticatedClientBuilder};
use kyc_core::User;
use log::*;
use serde_json::json;
use service::config::Config;

use crate::activity::ActivityLogger;
use crate::error::Error;
use crate::gateway::shufti_pro::VerificationApi;
use crate::storage::DocumentStorage;
use crate::verification::{DocumentUrl, VERIFICATION_REPORT, VERIFICATION_VIDEO};

pub struct DocumentService {
    api: Arc<dyn VerificationApi>,
    storage: Arc<dyn DocumentStorage>,
    downloader: AuthenticatedClient,
    max_file_size: u64,
    disk: String,
    path: String,
    activity: ActivityLogger,
}

impl DocumentService {
    pub fn new(
        config: &Config,
        api: Arc<dyn VerificationApi>,
        storage: Arc<dyn DocumentStorage>,
    ) -> Result<Self, Error> {
        // Document URLs are pre-signed, so downloads go out without credentials.
        let downloader = AuthenticatedClientBuilder::new()
            .with_timeout(Duration::from_secs(config.shuftipro_document_timeout))
            .without_json_accept()
            .build()?;

        Ok(Self {
            api,
            storage,
            downloader,
            max_file_size: config.shuftipro_max_file_size,
            disk: config.shuftipro_document_storage_disk().to_string(),
            path: config
                .shuftipro_document_storage_path()
                .trim_end_matches('/')
                .to_string(),
            activity: ActivityLogger::new(config),
        })
    }

    /// Fetch every document of `reference` and store it for `user`.
    ///
    /// Returns the stored paths in provider order. Looking up the document list
    /// is fatal when it fails; a document that cannot be fetched or stored is
    /// logged and skipped.
    pub async fn download_and_store_documents(
        &self,
        user: &User,
        reference: &str,
    ) -> Result<Vec<String>, Error> {
        self.activity.record(
            "Starting document download",
            &json!({"user_id": user.id, "reference": reference}),
        );

        let documents = match self.api.retrieve_verification(reference, true).await {
            Ok(response) => response.document_urls(),
            Err(e) => {
                warn!("Document download failed for {}: {}", reference, e);
                self.activity.record(
                    "Document download failed",
                    &json!({"user_id": user.id, "reference": reference, "error": e.to_string()}),
                );
                return Err(e);
            }
        };

        if documents.is_empty() {
            self.activity.record(
                "No documents found for reference",
                &json!({"reference": reference}),
            );
            return Ok(Vec::new());
        }

        let mut stored = Vec::with_capacity(documents.len());
        for document in &documents {
            if let Some(path) = self.download_and_store_document(user, reference, document).await {
                stored.push(path);
            }
        }

        info!(
            "Stored {} of {} documents for {}",
            stored.len(),
            documents.len(),
            reference
        );
        self.activity.record(
            "Document download completed",
            &json!({"user_id": user.id, "reference": reference, "files_count": stored.len()}),
        );

        Ok(stored)
    }

    async fn download_and_store_document(
        &self,
        user: &User,
        reference: &str,
        document: &DocumentUrl,
    ) -> Option<String> {
        let response = match self
            .downloader
            .get_limited(&document.url, self.max_file_size)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Error downloading document {}: {}", document.url, e);
                self.activity.record(
                    "Error downloading document",
                    &json!({"url": document.url, "error": e.to_string()}),
                );
                return None;
            }
        };

        if !response.status.is_success() {
            warn!(
                "Failed to download document {}: HTTP {}",
                document.url, response.status
            );
            self.activity.record(
                "Failed to download document",
                &json!({"url": document.url, "status": response.status.as_u16()}),
            );
            return None;
        }

        let file_name = file_name(user, reference, &document.document_type, document.index);
        let file_path = format!("{}/{}", self.path, file_name);

        match self.storage.put(&self.disk, &file_path, response.body).await {
            Ok(true) => {
                self.activity.record(
                    "Document stored successfully",
                    &json!({"file_path": file_path, "document_type": document.document_type}),
                );
                Some(file_path)
            }
            Ok(false) => {
                warn!("Failed to store document {}", file_path);
                self.activity
                    .record("Failed to store document", &json!({"file_path": file_path}));
                None
            }
            Err(e) => {
                warn!("Failed to store document {}: {}", file_path, e);
                self.activity.record(
                    "Failed to store document",
                    &json!({"file_path": file_path, "error": e.to_string()}),
                );
                None
            }
        }
    }

    pub fn document_url(&self, file_path: &str) -> String {
        self.storage.url(&self.disk, file_path)
    }

    pub async fn document_exists(&self, file_path: &str) -> Result<bool, Error> {
        self.storage.exists(&self.disk, file_path).await
    }

    /// Delete a stored document. A document that is already gone counts as deleted.
    pub async fn delete_document(&self, file_path: &str) -> Result<bool, Error> {
        if self.document_exists(file_path).await? {
            return self.storage.delete(&self.disk, file_path).await;
        }
        Ok(true)
    }
}

/// `<user id>_<reference>_<type>[_<index>].<ext>`; the index is left out for the first file.
pub fn file_name(user: &User, reference: &str, document_type: &str, index: usize) -> String {
    let index_suffix = if index > 0 {
        format!("_{}", index)
    } else {
        String::new()
    };
    format!(
        "{}_{}_{}{}.{}",
        user.id,
        reference,
        document_type,
        index_suffix,
        file_extension(document_type)
    )
}

fn file_extension(document_type: &str) -> &'static str {
    match document_type {
        VERIFICATION_VIDEO => "mp4",
        VERIFICATION_REPORT => "pdf",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, ExternalErrorKind};
    use crate::gateway::shufti_pro::MockVerificationApi;
    use crate::storage::{LocalDiskStorage, MockDocumentStorage};
    use crate::verification::ShuftiProResponse;
    use clap::Parser;
    use mockall::predicate::eq;
    use serde_json::Value;

    fn config() -> Config {
        Config::parse_from(["kyc"])
    }

    fn user() -> User {
        User::new("42", "test@example.com")
    }

    fn response(value: Value) -> ShuftiProResponse {
        let Value::Object(map) = value else {
            panic!("test payload must be an object");
        };
        ShuftiProResponse::from_payload(map)
    }

    fn api_returning(value: Value) -> MockVerificationApi {
        let mut api = MockVerificationApi::new();
        api.expect_retrieve_verification()
            .with(eq("SP_1"), eq(true))
            .times(1)
            .returning(move |_, _| Ok(response(value.clone())));
        api
    }

    #[test]
    fn test_file_names() {
        let user = user();
        assert_eq!(file_name(&user, "SP_1", "selfie", 0), "42_SP_1_selfie.jpg");
        assert_eq!(
            file_name(&user, "SP_1", "document_image", 2),
            "42_SP_1_document_image_2.jpg"
        );
        assert_eq!(
            file_name(&user, "SP_1", VERIFICATION_VIDEO, 0),
            "42_SP_1_verification_video.mp4"
        );
        assert_eq!(
            file_name(&user, "SP_1", VERIFICATION_REPORT, 0),
            "42_SP_1_verification_report.pdf"
        );
    }

    #[tokio::test]
    async fn test_downloads_in_order_and_skips_failures() {
        let mut server = mockito::Server::new_async().await;
        let _front = server
            .mock("GET", "/front.jpg")
            .with_status(200)
            .with_body("front")
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/back.jpg")
            .with_status(404)
            .create_async()
            .await;
        let _report = server
            .mock("GET", "/report.pdf")
            .with_status(200)
            .with_body("report")
            .create_async()
            .await;

        let api = api_returning(json!({
            "reference": "SP_1",
            "event": "verification.accepted",
            "document_images": [
                format!("{}/front.jpg", server.url()),
                format!("{}/back.jpg", server.url())
            ],
            "verification_report": format!("{}/report.pdf", server.url())
        }));

        let root = std::env::temp_dir().join(format!("kyc-docs-{}", uuid::Uuid::new_v4()));
        let storage = Arc::new(LocalDiskStorage::new(&root));
        let service = DocumentService::new(&config(), Arc::new(api), storage).unwrap();

        let stored = service
            .download_and_store_documents(&user(), "SP_1")
            .await
            .unwrap();

        assert_eq!(
            stored,
            vec![
                "shuftipro/documents/42_SP_1_document_image.jpg".to_string(),
                "shuftipro/documents/42_SP_1_verification_report.pdf".to_string(),
            ]
        );
        assert!(service.document_exists(&stored[1]).await.unwrap());
        assert_eq!(
            std::fs::read(root.join("s3").join(&stored[0])).unwrap(),
            b"front".to_vec()
        );

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_oversized_document_is_skipped() {
        let mut server = mockito::Server::new_async().await;
        let _front = server
            .mock("GET", "/front.jpg")
            .match_header("accept", "*/*")
            .with_status(200)
            .with_body("front-image")
            .create_async()
            .await;
        let _back = server
            .mock("GET", "/back.jpg")
            .with_status(200)
            .with_body("back")
            .create_async()
            .await;

        let api = api_returning(json!({
            "document_images": [
                format!("{}/front.jpg", server.url()),
                format!("{}/back.jpg", server.url())
            ]
        }));
        let mut storage = MockDocumentStorage::new();
        storage
            .expect_put()
            .withf(|_, path, contents| {
                path == "shuftipro/documents/42_SP_1_document_image_1.jpg" && contents == b"back"
            })
            .times(1)
            .returning(|_, _, _| Ok(true));

        let config = Config::parse_from(["kyc", "--shuftipro-max-file-size", "4"]);
        let service = DocumentService::new(&config, Arc::new(api), Arc::new(storage)).unwrap();
        let stored = service
            .download_and_store_documents(&user(), "SP_1")
            .await
            .unwrap();

        assert_eq!(
            stored,
            vec!["shuftipro/documents/42_SP_1_document_image_1.jpg".to_string()]
        );
    }

    #[tokio::test]
    async fn test_no_documents_yields_empty_list() {
        let api = api_returning(json!({"reference": "SP_1", "event": "verification.pending"}));
        let mut storage = MockDocumentStorage::new();
        storage.expect_put().never();

        let service =
            DocumentService::new(&config(), Arc::new(api), Arc::new(storage)).unwrap();
        let stored = service
            .download_and_store_documents(&user(), "SP_1")
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_fatal() {
        let mut api = MockVerificationApi::new();
        api.expect_retrieve_verification().returning(|_, _| {
            Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            })
        });

        let service = DocumentService::new(
            &config(),
            Arc::new(api),
            Arc::new(MockDocumentStorage::new()),
        )
        .unwrap();
        let result = service.download_and_store_documents(&user(), "SP_1").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_storage_refusal_is_skipped() {
        let mut server = mockito::Server::new_async().await;
        let _selfie = server
            .mock("GET", "/selfie.jpg")
            .with_status(200)
            .with_body("selfie")
            .create_async()
            .await;

        let api = api_returning(json!({
            "document_images": {"selfie": format!("{}/selfie.jpg", server.url())}
        }));
        let mut storage = MockDocumentStorage::new();
        storage
            .expect_put()
            .withf(|disk, path, contents| {
                disk == "s3"
                    && path == "shuftipro/documents/42_SP_1_selfie.jpg"
                    && contents == b"selfie"
            })
            .times(1)
            .returning(|_, _, _| Ok(false));

        let service =
            DocumentService::new(&config(), Arc::new(api), Arc::new(storage)).unwrap();
        let stored = service
            .download_and_store_documents(&user(), "SP_1")
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_document_is_true() {
        let mut storage = MockDocumentStorage::new();
        storage.expect_exists().returning(|_, _| Ok(false));
        storage.expect_delete().never();

        let service = DocumentService::new(
            &config(),
            Arc::new(MockVerificationApi::new()),
            Arc::new(storage),
        )
        .unwrap();
        assert!(service.delete_document("missing.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn test_document_url_uses_configured_disk() {
        let mut storage = MockDocumentStorage::new();
        storage
            .expect_url()
            .with(eq("s3"), eq("shuftipro/documents/a.jpg"))
            .returning(|_, path| format!("https://cdn.test/{}", path));

        let service = DocumentService::new(
            &config(),
            Arc::new(MockVerificationApi::new()),
            Arc::new(storage),
        )
        .unwrap();
        assert_eq!(
            service.document_url("shuftipro/documents/a.jpg"),
            "https://cdn.test/shuftipro/documents/a.jpg"
        );
    }
}
