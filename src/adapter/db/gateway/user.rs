use async_trait::async_trait;
use futures::FutureExt;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::adapter::db::session::SqlxSession;
use crate::application::app_error::{AppError, AppResult};
use crate::application::interface::gateway::user::{UserReader, UserWriter};
use crate::domain::entities::handle::Handle;
use crate::domain::entities::id::Id;
use crate::domain::entities::user::User;

const HANDLE_CONSTRAINT: &str = "users_handle_key";

#[derive(Clone)]
pub struct UserGateway {
    session: SqlxSession,
}

impl UserGateway {
    pub fn new(session: SqlxSession) -> Self {
        Self { session }
    }

    fn map_user(row: PgRow) -> AppResult<User> {
        let handle: String = row.try_get("handle")?;
        Ok(User {
            id: Id::new(row.try_get("id")?),
            email: row.try_get("email")?,
            display_name: row.try_get("display_name")?,
            handle: Handle::parse(&handle)
                .map_err(|e| AppError::PersistenceError(format!("stored handle `{}`: {}", handle, e)))?,
            password: row.try_get("password")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Unique violations surface as the matching domain conflict.
    fn map_insert_error(err: sqlx::Error) -> AppError {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                if db_err.constraint() == Some(HANDLE_CONSTRAINT) {
                    AppError::HandleTaken
                } else {
                    AppError::EmailTaken
                }
            }
            _ => AppError::DatabaseError(err),
        }
    }
}

#[async_trait]
impl UserWriter for UserGateway {
    async fn insert(&self, user: User) -> AppResult<Id<User>> {
        self.session
            .with_tx(|tx| {
                let user = user.clone();
                async move {
                    let result = sqlx::query(
                        r#"
                            INSERT INTO users
                                (id, email, display_name, handle, password, created_at, updated_at)
                            VALUES
                                ($1, $2, $3, $4, $5, $6, $7)
                            RETURNING
                                id
                        "#,
                    )
                    .bind(user.id.value)
                    .bind(&user.email)
                    .bind(&user.display_name)
                    .bind(user.handle.as_str())
                    .bind(&user.password)
                    .bind(user.created_at)
                    .bind(user.updated_at)
                    .fetch_one(tx.as_mut())
                    .await
                    .map_err(Self::map_insert_error)?;
                    let id: Uuid = result.try_get("id")?;
                    Ok(Id::new(id))
                }
                .boxed()
            })
            .await
    }
}

#[async_trait]
impl UserReader for UserGateway {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.session
            .with_tx(|tx| {
                let email = email.to_owned();
                async move {
                    let result = sqlx::query(
                        r#"
                            SELECT
                                id, email, display_name, handle, password, created_at, updated_at
                            FROM
                                users
                            WHERE lower(email) = lower($1)
                        "#,
                    )
                    .bind(&email)
                    .fetch_optional(tx.as_mut())
                    .await?;

                    result.map(Self::map_user).transpose()
                }
                .boxed()
            })
            .await
    }

    async fn find_by_id(&self, user_id: &Id<User>) -> AppResult<Option<User>> {
        self.session
            .with_tx(|tx| {
                let user_id = user_id.value;
                async move {
                    let result = sqlx::query(
                        r#"
                            SELECT
                                id, email, display_name, handle, password, created_at, updated_at
                            FROM
                                users
                            WHERE id = $1
                        "#,
                    )
                    .bind(user_id)
                    .fetch_optional(tx.as_mut())
                    .await?;

                    result.map(Self::map_user).transpose()
                }
                .boxed()
            })
            .await
    }

    async fn is_email_taken(&self, email: &str) -> AppResult<bool> {
        self.session
            .with_tx(|tx| {
                let email = email.to_owned();
                async move {
                    let result = sqlx::query(
                        r#"
                            SELECT EXISTS(
                                SELECT id FROM users WHERE lower(email) = lower($1)
                            ) AS is_taken
                        "#,
                    )
                    .bind(&email)
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
