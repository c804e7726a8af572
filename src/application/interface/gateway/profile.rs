use async_trait::async_trait;

use crate::application::app_error::AppResult;
use crate::domain::entities::handle::Handle;
use crate::domain::entities::profile::ProfileDocument;

#[async_trait]
pub trait ProfileReader: Send + Sync {
    async fn find_by_handle(&self, handle: &Handle) -> AppResult<Option<ProfileDocument>>;
    async fn exists(&self, handle: &Handle) -> AppResult<bool>;
}

#[async_trait]
pub trait ProfileWriter: Send + Sync {
    /// Claims the handle; `false` when a document already holds it.
    async fn insert_if_absent(&self, document: ProfileDocument) -> AppResult<bool>;
    /// Overwrites the stored document of `document.handle`.
    async fn replace(&self, document: ProfileDocument) -> AppResult<()>;
}
