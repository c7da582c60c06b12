/// Content-addressed image store
use crate::{
    blob_store::{disk::DiskImageBackend, ImageBackend},
    error::{HubError, HubResult},
};
use sha2::{Digest, Sha256};
use std::{path::PathBuf, sync::Arc};

/// Key for a stored image: lowercase hex SHA-256 of its bytes
pub fn image_key(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub key: String,
    pub mime_type: String,
    pub size: usize,
}

/// Image store with size and type checks in front of a backend
#[derive(Clone)]
pub struct ImageStore {
    backend: Arc<dyn ImageBackend>,
    max_size: usize,
}

impl ImageStore {
    pub fn new(backend: Arc<dyn ImageBackend>, max_size: usize) -> Self {
        Self { backend, max_size }
    }

    /// Disk-backed store rooted at `directory`
    pub fn on_disk(directory: PathBuf, max_size: usize) -> Self {
        Self::new(Arc::new(DiskImageBackend::new(directory)), max_size)
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Validate and store an upload
    ///
    /// Identical bytes map to the same key and are written once.
    pub async fn store(&self, data: Vec<u8>, mime_type: &str) -> HubResult<StoredImage> {
        let mime_type = mime_type.trim().to_lowercase();
        if !mime_type.starts_with("image/") {
            return Err(HubError::Validation(
                "Content-Type must be an image type".to_string(),
            ));
        }
        if data.is_empty() {
            return Err(HubError::Validation("Image body is empty".to_string()));
        }
        if data.len() > self.max_size {
            return Err(HubError::Validation(format!(
                "Image exceeds the {} byte limit",
                self.max_size
            )));
        }

        let key = image_key(&data);
        let size = data.len();

        if !self.backend.exists(&key).await? {
            self.backend.put(&key, data).await?;
            tracing::debug!("Stored image {} ({} bytes)", key, size);
        }

        Ok(StoredImage {
            key,
            mime_type,
            size,
        })
    }

    pub async fn fetch(&self, key: &str) -> HubResult<Option<Vec<u8>>> {
        self.backend.get(key).await
    }

    pub async fn remove(&self, key: &str) -> HubResult<()> {
        self.backend.delete(key).await
    }
}
