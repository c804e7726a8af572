use async_trait::async_trait;
use bytes::Bytes;

use crate::application::app_error::AppResult;

/// Object storage for uploaded media. Paths are relative to the configured bucket.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `data` under `path` and returns its public retrieval URL.
    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> AppResult<String>;
    async fn delete(&self, url: &str) -> AppResult<()>;
    /// Object path of a URL this store handed out, `None` for anything else.
    fn key_of(&self, url: &str) -> Option<String>;
}
