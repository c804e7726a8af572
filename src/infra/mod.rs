use std::sync::Arc;

use crate::adapter::crypto::argon2::Argon2CredentialsHasher;
use crate::adapter::media::inspector::ImageMediaInspector;
use crate::adapter::storage::s3::S3BlobStore;
use crate::application::drafts::DraftRegistry;
use crate::infra::config::AppConfig;
use crate::infra::db::init_db;
use crate::infra::state::AppState;

pub mod app;
pub mod config;
pub mod db;
pub mod setup;
pub mod state;

pub async fn init_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let pool = init_db(config).await?;

    let storage = S3BlobStore::new(&config.s3);
    storage.ensure_bucket().await?;

    Ok(AppState {
        pool,
        hasher: Arc::new(Argon2CredentialsHasher::default()),
        config: Arc::new(config.clone()),
        storage: Arc::new(storage),
        inspector: Arc::new(ImageMediaInspector),
        drafts: Arc::new(DraftRegistry::new()),
    })
}
