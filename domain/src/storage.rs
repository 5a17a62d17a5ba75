//! Storage backends for downloaded verification documents.
//!
//! Every call names the disk it targets. [`LocalDiskStorage`] maps each disk to
//! a sub-directory of one root directory.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use log::*;
use tokio::fs;

use crate::error::{DomainErrorKind, Error, InternalErrorKind};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Write `contents` to `path`, returning whether the write happened.
    async fn put(&self, disk: &str, path: &str, contents: Vec<u8>) -> Result<bool, Error>;

    async fn exists(&self, disk: &str, path: &str) -> Result<bool, Error>;

    /// Location at which a stored document can be retrieved.
    fn url(&self, disk: &str, path: &str) -> String;

    async fn delete(&self, disk: &str, path: &str) -> Result<bool, Error>;
}

/// Documents kept on the local file system under `<root>/<disk>/<path>`.
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a disk-relative path, refusing anything that could escape the root.
    fn resolve(&self, disk: &str, path: &str) -> Result<PathBuf, Error> {
        let relative = Path::new(disk).join(path);
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            warn!("Refusing document path outside storage root: {:?}", relative);
            return Err(Error {
                source: Some(format!("invalid document path {:?}", relative).into()),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Storage),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentStorage for LocalDiskStorage {
    async fn put(&self, disk: &str, path: &str, contents: Vec<u8>) -> Result<bool, Error> {
        let target = self.resolve(disk, path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, contents).await?;
        debug!("Stored document at {:?}", target);
        Ok(true)
    }

    async fn exists(&self, disk: &str, path: &str) -> Result<bool, Error> {
        let target = self.resolve(disk, path)?;
        Ok(fs::try_exists(target).await?)
    }

    fn url(&self, disk: &str, path: &str) -> String {
        format!(
            "file://{}",
            self.root.join(disk).join(path).to_string_lossy()
        )
    }

    async fn delete(&self, disk: &str, path: &str) -> Result<bool, Error> {
        let target = self.resolve(disk, path)?;
        fs::remove_file(target).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kyc-storage-{}-{}", name, uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_put_exists_delete_round_trip() {
        let root = temp_root("round-trip");
        let storage = LocalDiskStorage::new(&root);
        let path = "shuftipro/documents/42_SP_1_selfie.jpg";

        assert!(!storage.exists("local", path).await.unwrap());
        assert!(storage.put("local", path, b"jpeg".to_vec()).await.unwrap());
        assert!(storage.exists("local", path).await.unwrap());
        assert_eq!(
            std::fs::read(root.join("local").join(path)).unwrap(),
            b"jpeg".to_vec()
        );

        assert!(storage.delete("local", path).await.unwrap());
        assert!(!storage.exists("local", path).await.unwrap());

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_parent_directory_paths_are_rejected() {
        let storage = LocalDiskStorage::new(temp_root("escape"));
        let err = storage
            .put("local", "../outside.jpg", Vec::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Storage)
        );
    }

    #[test]
    fn test_url_points_into_disk() {
        let storage = LocalDiskStorage::new("/var/kyc");
        assert_eq!(
            storage.url("s3", "shuftipro/documents/a.jpg"),
            "file:///var/kyc/s3/shuftipro/documents/a.jpg"
        );
    }
}
