use async_trait::async_trait;
use futures::FutureExt;
use sqlx::Row;
use sqlx::types::Json;
use uuid::Uuid;

use crate::adapter::db::session::SqlxSession;
use crate::application::app_error::{AppError, AppResult};
use crate::application::interface::gateway::profile::{ProfileReader, ProfileWriter};
use crate::domain::entities::handle::Handle;
use crate::domain::entities::profile::ProfileDocument;

/// Profile documents stored as JSONB, keyed by handle.
#[derive(Clone)]
pub struct ProfileGateway {
    session: SqlxSession,
}

impl ProfileGateway {
    pub fn new(session: SqlxSession) -> Self {
        Self { session }
    }

    fn owner_uuid(document: &ProfileDocument) -> AppResult<Uuid> {
        Uuid::parse_str(&document.owner_id).map_err(|e| AppError::InvalidId(e.to_string()))
    }
}

#[async_trait]
impl ProfileReader for ProfileGateway {
    async fn find_by_handle(&self, handle: &Handle) -> AppResult<Option<ProfileDocument>> {
        self.session
            .with_tx(|tx| {
                let handle = handle.as_str().to_owned();
                async move {
                    let result = sqlx::query("SELECT document FROM profiles WHERE handle = $1")
                        .bind(&handle)
                        .fetch_optional(tx.as_mut())
                        .await?;
                    let Some(row) = result else {
                        return Ok(None);
                    };
                    let Json(value): Json<serde_json::Value> = row.try_get("document")?;
                    let document = ProfileDocument::from_stored(value)
                        .map_err(|e| AppError::PersistenceError(format!("profile `{}`: {}", handle, e)))?;
                    Ok(Some(document))
                }
                .boxed()
            })
            .await
    }

    async fn exists(&self, handle: &Handle) -> AppResult<bool> {
        self.session
            .with_tx(|tx| {
                let handle = handle.as_str().to_owned();
                async move {
                    let result =
                        sqlx::query("SELECT EXISTS(SELECT 1 FROM profiles WHERE handle = $1) AS is_taken")
                            .bind(&handle)
                            .fetch_one(tx.as_mut())
                            .await?;
                    let is_taken: bool = result.try_get("is_taken")?;
                    Ok(is_taken)
                }
                .boxed()
            })
            .await
    }
}

#[async_trait]
impl ProfileWriter for ProfileGateway {
    async fn insert_if_absent(&self, document: ProfileDocument) -> AppResult<bool> {
        let owner_id = Self::owner_uuid(&document)?;
        self.session
            .with_tx(|tx| {
                let document = document.clone();
                async move {
                    let result = sqlx::query(
                        r#"
                            INSERT INTO profiles
                                (handle, owner_id, document, created_at, updated_at)
                            VALUES
                                ($1, $2, $3, $4, $5)
                            ON CONFLICT (handle) DO NOTHING
                        "#,
                    )
                    .bind(document.handle.as_str())
                    .bind(owner_id)
                    .bind(Json(&document))
                    .bind(document.created_at)
                    .bind(document.updated_at)
                    .execute(tx.as_mut())
                    .await?;
                    Ok(result.rows_affected() == 1)
                }
                .boxed()
            })
            .await
    }

    async fn replace(&self, document: ProfileDocument) -> AppResult<()> {
        self.session
            .with_tx(|tx| {
                let document = document.clone();
                async move {
                    let result = sqlx::query(
                        r#"
                            UPDATE
                                profiles
                            SET
                                document = $2, updated_at = $3
                            WHERE
                                handle = $1
                        "#,
                    )
                    .bind(document.handle.as_str())
                    .bind(Json(&document))
                    .bind(document.updated_at)
                    .execute(tx.as_mut())
                    .await?;
                    if result.rows_affected() == 0 {
                        return Err(AppError::ProfileNotFound);
                    }
                    Ok(())
                }
                .boxed()
            })
            .await
    }
}
