//! Storage service implementation using Apache OpenDAL.

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};

use super::config::StorageProvider;
use super::error::StorageError;
use crate::attachment::AttachmentStore;

/// Storage service for attachment bytes.
///
/// One OpenDAL operator, created once from the configured provider and
/// shared across requests.
pub struct StorageService {
    operator: Operator,
    provider_name: &'static str,
}

impl StorageService {
    /// Create a new storage service for a provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn new(provider: &StorageProvider) -> Result<Self, StorageError> {
        let operator = Self::create_operator(provider)?;
        Ok(Self {
            operator,
            provider_name: provider.name(),
        })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
        };
        Ok(operator)
    }

    /// Write an object under a server-generated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_bytes(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        self.operator
            .write(key, data)
            .await
            .map(|_| ())
            .map_err(StorageError::from)
    }

    /// Read an object's bytes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the object does not exist.
    pub async fn read_bytes(&self, key: &str) -> Result<Bytes, StorageError> {
        self.operator
            .read(key)
            .await
            .map(|buffer| buffer.to_bytes())
            .map_err(StorageError::from)
    }

    /// Delete an object. Deleting an absent object is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete operation fails.
    pub async fn delete_bytes(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if an object exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub const fn provider_name(&self) -> &'static str {
        self.provider_name
    }
}

impl AttachmentStore for StorageService {
    async fn write_bytes(&self, stored_name: &str, data: Bytes) -> Result<(), StorageError> {
        Self::write_bytes(self, stored_name, data).await
    }

    async fn delete_bytes(&self, stored_name: &str) -> Result<(), StorageError> {
        Self::delete_bytes(self, stored_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageProvider;

    fn local_service() -> (tempdir::TempDirGuard, StorageService) {
        let dir = tempdir::unique_dir();
        let service = StorageService::new(&StorageProvider::local_fs(&dir.path))
            .expect("local fs service");
        (dir, service)
    }

    /// Minimal unique temp directory helper; removed on drop.
    mod tempdir {
        use std::path::PathBuf;
        use std::sync::atomic::{AtomicU32, Ordering};

        static COUNTER: AtomicU32 = AtomicU32::new(0);

        pub struct TempDirGuard {
            pub path: PathBuf,
        }

        impl Drop for TempDirGuard {
            fn drop(&mut self) {
                let _ = std::fs::remove_dir_all(&self.path);
            }
        }

        pub fn unique_dir() -> TempDirGuard {
            let path = std::env::temp_dir().join(format!(
                "corkboard-storage-test-{}-{}",
                std::process::id(),
                COUNTER.fetch_add(1, Ordering::SeqCst)
            ));
            std::fs::create_dir_all(&path).expect("create temp dir");
            TempDirGuard { path }
        }
    }

    #[tokio::test]
    async fn test_write_read_round_trip() {
        let (_dir, service) = local_service();

        service
            .write_bytes("abc123.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        let data = service.read_bytes("abc123.txt").await.unwrap();
        assert_eq!(&data[..], b"hello");
    }

    #[tokio::test]
    async fn test_exists_and_delete() {
        let (_dir, service) = local_service();

        service
            .write_bytes("to-delete.bin", Bytes::from_static(b"x"))
            .await
            .unwrap();
        assert!(service.exists("to-delete.bin").await);

        service.delete_bytes("to-delete.bin").await.unwrap();
        assert!(!service.exists("to-delete.bin").await);
    }

    #[tokio::test]
    async fn test_delete_absent_object_is_ok() {
        let (_dir, service) = local_service();
        assert!(service.delete_bytes("never-written").await.is_ok());
    }

    #[tokio::test]
    async fn test_read_missing_object_is_not_found() {
        let (_dir, service) = local_service();
        let err = service.read_bytes("missing").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }
}
