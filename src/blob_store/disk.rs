/// Disk-based image storage backend
use crate::{
    blob_store::ImageBackend,
    error::{HubError, HubResult},
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Disk storage backend
///
/// Shards files by the first two characters of the key.
#[derive(Clone)]
pub struct DiskImageBackend {
    base_path: PathBuf,
}

impl DiskImageBackend {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `{base}/{first2chars}/{key}`
    fn image_path(&self, key: &str) -> PathBuf {
        match key.get(0..2) {
            Some(shard) => self.base_path.join(shard).join(key),
            None => self.base_path.join("_").join(key),
        }
    }
}

#[async_trait]
impl ImageBackend for DiskImageBackend {
    async fn put(&self, key: &str, data: Vec<u8>) -> HubResult<()> {
        let path = self.image_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                HubError::ImageStorage(format!("Failed to create image directory: {}", e))
            })?;
        }

        fs::write(&path, data)
            .await
            .map_err(|e| HubError::ImageStorage(format!("Failed to write image {}: {}", key, e)))
    }

    async fn get(&self, key: &str) -> HubResult<Option<Vec<u8>>> {
        match fs::read(self.image_path(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HubError::ImageStorage(format!(
                "Failed to read image {}: {}",
                key, e
            ))),
        }
    }

    async fn delete(&self, key: &str) -> HubResult<()> {
        match fs::remove_file(self.image_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HubError::ImageStorage(format!(
                "Failed to delete image {}: {}",
                key, e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> HubResult<bool> {
        Ok(fs::try_exists(self.image_path(key)).await.unwrap_or(false))
    }
}
