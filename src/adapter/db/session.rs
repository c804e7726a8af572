use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use sqlx::{Pool, Postgres, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::app_error::{AppError, AppResult};
use crate::application::interface::db::DBSession;

struct UnitOfWork {
    pool: Pool<Postgres>,
    transaction: Option<Transaction<'static, Postgres>>,
}

/// Transaction shared by the gateways of one request. It is opened by the first statement and
/// ends with `commit` or `rollback`; a later statement opens a new one.
#[derive(Clone)]
pub struct SqlxSession {
    inner: Arc<Mutex<UnitOfWork>>,
}

impl SqlxSession {
    pub fn new_lazy(pool: Pool<Postgres>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(UnitOfWork {
                pool,
                transaction: None,
            })),
        }
    }

    pub async fn with_tx<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a mut Transaction<'static, Postgres>) -> BoxFuture<'a, AppResult<T>>,
    {
        let mut inner = self.inner.lock().await;
        if inner.transaction.is_none() {
            let tx = inner.pool.begin().await?;
            inner.transaction = Some(tx);
        }
        let tx = inner
            .transaction
            .as_mut()
            .ok_or(AppError::DatabaseError(sqlx::Error::PoolClosed))?;
        f(tx).await
    }
}

#[async_trait]
impl DBSession for SqlxSession {
    async fn commit(&self) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(tx) = inner.transaction.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    async fn rollback(&self) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(tx) = inner.transaction.take() {
            tx.rollback().await?;
            debug!("Transaction rolled back");
        }
        Ok(())
    }
}
