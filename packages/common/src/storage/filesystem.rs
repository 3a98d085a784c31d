use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::error::StorageError;
use super::hash::ContentHash;
use super::path::BlobPath;
use super::traits::{BlobStore, StoredBlob};

/// Filesystem-backed blob store rooted at `base_path`.
///
/// A blob at `design_documents/a.pdf` lives at `{base_path}/design_documents/a.pdf`.
/// Writes go to `{base_path}/.tmp` first and are renamed into place, so readers
/// never observe a half-written file.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    fn resolve(&self, path: &BlobPath) -> PathBuf {
        let mut full = self.base_path.clone();
        full.extend(path.segments());
        full
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    fn not_found_as(path: &BlobPath, e: std::io::Error) -> StorageError {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(path.to_string())
        } else {
            e.into()
        }
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, path: &BlobPath, data: &[u8]) -> Result<StoredBlob, StorageError> {
        let size = data.len() as u64;
        if size > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: size,
                limit: self.max_size,
            });
        }

        let target = self.resolve(path);
        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        let content_hash = ContentHash::compute(data);
        debug!(path = %path, size, hash = %content_hash, "Stored blob");

        Ok(StoredBlob {
            path: path.clone(),
            size,
            content_hash,
        })
    }

    async fn get(&self, path: &BlobPath) -> Result<Vec<u8>, StorageError> {
        fs::read(self.resolve(path))
            .await
            .map_err(|e| Self::not_found_as(path, e))
    }

    async fn delete(&self, path: &BlobPath) -> Result<bool, StorageError> {
        match fs::remove_file(self.resolve(path)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
