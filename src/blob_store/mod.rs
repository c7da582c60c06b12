/// Hostel image storage
///
/// Images are content-addressed by the SHA-256 of their bytes and kept
/// behind a backend trait so storage can move off local disk later.

pub mod disk;
pub mod store;

pub use disk::DiskImageBackend;
pub use store::{image_key, ImageStore, StoredImage};

use crate::error::HubResult;
use async_trait::async_trait;

/// Image storage backend trait
///
/// Implementations handle the actual storage and retrieval of image bytes.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Store bytes under a key
    async fn put(&self, key: &str, data: Vec<u8>) -> HubResult<()>;

    /// Retrieve bytes by key
    async fn get(&self, key: &str) -> HubResult<Option<Vec<u8>>>;

    /// Delete by key; missing keys are not an error
    async fn delete(&self, key: &str) -> HubResult<()>;

    /// Check if a key is stored
    async fn exists(&self, key: &str) -> HubResult<bool>;
}
