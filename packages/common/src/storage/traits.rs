use async_trait::async_trait;

use super::error::StorageError;
use super::hash::ContentHash;
use super::path::BlobPath;

/// Metadata returned after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub path: BlobPath,
    pub size: u64,
    pub content_hash: ContentHash,
}

/// Path-addressed blob storage. Writing to an existing path replaces it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes at `path`, overwriting whatever was there.
    async fn put(&self, path: &BlobPath, data: &[u8]) -> Result<StoredBlob, StorageError>;

    /// Retrieve all bytes stored at `path`.
    async fn get(&self, path: &BlobPath) -> Result<Vec<u8>, StorageError>;

    /// Retrieve bytes and check them against the hash recorded at write time.
    ///
    /// Fails with `ChecksumMismatch` when a later write replaced the blob.
    async fn get_verified(
        &self,
        path: &BlobPath,
        expected: &ContentHash,
    ) -> Result<Vec<u8>, StorageError> {
        let data = self.get(path).await?;
        if !expected.matches(&data) {
            return Err(StorageError::ChecksumMismatch {
                path: path.to_string(),
                expected: expected.to_hex(),
                actual: ContentHash::compute(&data).to_hex(),
            });
        }
        Ok(data)
    }

    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, path: &BlobPath) -> Result<bool, StorageError>;
}
