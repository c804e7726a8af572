use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{info, warn};

use crate::application::app_error::{AppError, AppResult};
use crate::application::interface::s3::BlobStore;
use crate::infra::config::S3Config;

/// Blob store backed by any S3 compatible endpoint. Objects are served from `public_url`.
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    public_url: String,
}

impl S3BlobStore {
    pub fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(&config.access_key, &config.secret_key, None, None, "promo-page");
        let s3_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            public_url: config.public_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn ensure_bucket(&self) -> AppResult<()> {
        if self.client.head_bucket().bucket(&self.bucket).send().await.is_ok() {
            return Ok(());
        }

        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                info!("Bucket '{}' created", self.bucket);
                Ok(())
            }
            Err(SdkError::ServiceError(err)) => match err.err() {
                CreateBucketError::BucketAlreadyExists(_) | CreateBucketError::BucketAlreadyOwnedByYou(_) => Ok(()),
                other => {
                    warn!("Failed to create bucket '{}': {:?}", self.bucket, other);
                    Err(AppError::UploadError(other.to_string()))
                }
            },
            Err(e) => Err(AppError::UploadError(e.to_string())),
        }
    }

    pub fn public_url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> AppResult<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                warn!("S3 upload error bucket={} key={}: {:?}", self.bucket, path, e);
                AppError::UploadError(e.to_string())
            })?;

        info!("Uploaded s3://{}/{}", self.bucket, path);
        Ok(self.public_url_for(path))
    }

    async fn delete(&self, url: &str) -> AppResult<()> {
        let key = self
            .key_of(url)
            .ok_or_else(|| AppError::invalid_field("url", "not served by this store"))?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                warn!("S3 delete error bucket={} key={}: {:?}", self.bucket, key, e);
                AppError::UploadError(e.to_string())
            })?;

        info!("Deleted s3://{}/{}", self.bucket, key);
        Ok(())
    }

    fn key_of(&self, url: &str) -> Option<String> {
        let key = url.strip_prefix(self.public_url.as_str())?.strip_prefix('/')?;
        if key.is_empty() || key.split('/').any(|segment| segment.is_empty() || segment == "..") {
            return None;
        }
        Some(key.to_string())
    }
}
