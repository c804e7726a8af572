use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use crate::application::app_error::{AppError, AppResult};
use crate::application::dto::profile::DraftAccessDTO;

/// Identity of the signed-in caller, attached to the request by the session middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub handle: String,
}

impl AuthUser {
    pub fn draft_access(&self, handle: &str) -> DraftAccessDTO {
        DraftAccessDTO {
            handle: handle.to_string(),
            user_id: self.user_id.clone(),
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> AppResult<Self> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::InvalidCredentials)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> AppResult<Option<Self>> {
        Ok(parts.extensions.get::<AuthUser>().cloned())
    }
}
