use async_trait::async_trait;

use crate::application::app_error::AppResult;

#[async_trait]
pub trait CredentialsHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> AppResult<String>;
    /// `Ok(false)` for a wrong password; errors only when `hashed` is not a valid hash.
    async fn verify_password(&self, password: &str, hashed: &str) -> AppResult<bool>;
}
