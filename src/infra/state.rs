use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use sqlx::{Pool, Postgres};

use crate::adapter::db::gateway::profile::ProfileGateway;
use crate::adapter::db::gateway::session::SessionGateway;
use crate::adapter::db::gateway::user::UserGateway;
use crate::adapter::db::session::SqlxSession;
use crate::application::app_error::{AppError, AppResult};
use crate::application::drafts::DraftRegistry;
use crate::application::interactors::auth::{
    GetCurrentIdentityInteractor, SignInInteractor, SignOutInteractor, SignUpInteractor,
};
use crate::application::interactors::media::{
    DeleteSectionMediaInteractor, UploadProfileImageInteractor, UploadSectionMediaInteractor,
};
use crate::application::interactors::profile::{
    AddCustomSectionInteractor, DiscardDraftInteractor, DraftContext, EditDraftInteractor, GetPublicProfileInteractor,
    MoveSectionInteractor, OpenDraftInteractor, RemoveSectionInteractor, SaveDraftInteractor,
    SetSectionVisibilityInteractor,
};
use crate::application::interactors::session::ValidateSessionInteractor;
use crate::application::interface::crypto::CredentialsHasher;
use crate::application::interface::media::MediaInspector;
use crate::application::interface::s3::BlobStore;
use crate::infra::config::{AppConfig, MediaConfig};

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
    pub hasher: Arc<dyn CredentialsHasher>,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn BlobStore>,
    pub inspector: Arc<dyn MediaInspector>,
    pub drafts: Arc<DraftRegistry>,
}

impl AppState {
    fn draft_context(&self, session: &SqlxSession) -> DraftContext {
        DraftContext::new(self.drafts.clone(), Arc::new(ProfileGateway::new(session.clone())))
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for MediaConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.media.clone()
    }
}

/// Builds an interactor for one request; every interactor gets its own unit of work.
#[async_trait]
pub trait FromAppState: Sized {
    async fn from_app_state(state: &AppState) -> AppResult<Self>;
}

#[async_trait]
impl FromAppState for SignUpInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let session = SqlxSession::new_lazy(state.pool.clone());
        let user_gateway = Arc::new(UserGateway::new(session.clone()));
        let profile_gateway = Arc::new(ProfileGateway::new(session.clone()));
        Ok(SignUpInteractor::new(
            Arc::new(session.clone()),
            user_gateway.clone(),
            user_gateway,
            profile_gateway.clone(),
            profile_gateway,
            Arc::new(SessionGateway::new(session)),
            state.hasher.clone(),
        ))
    }
}

#[async_trait]
impl FromAppState for SignInInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let session = SqlxSession::new_lazy(state.pool.clone());
        Ok(SignInInteractor::new(
            Arc::new(session.clone()),
            Arc::new(UserGateway::new(session.clone())),
            Arc::new(SessionGateway::new(session)),
            state.hasher.clone(),
        ))
    }
}

#[async_trait]
impl FromAppState for SignOutInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let session = SqlxSession::new_lazy(state.pool.clone());
        Ok(SignOutInteractor::new(
            Arc::new(session.clone()),
            Arc::new(SessionGateway::new(session)),
            state.drafts.clone(),
        ))
    }
}

#[async_trait]
impl FromAppState for GetCurrentIdentityInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let session = SqlxSession::new_lazy(state.pool.clone());
        Ok(GetCurrentIdentityInteractor::new(Arc::new(UserGateway::new(session))))
    }
}

#[async_trait]
impl FromAppState for ValidateSessionInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let session = SqlxSession::new_lazy(state.pool.clone());
        let session_gateway = Arc::new(SessionGateway::new(session.clone()));
        Ok(ValidateSessionInteractor::new(
            Arc::new(session.clone()),
            session_gateway.clone(),
            session_gateway,
            Arc::new(UserGateway::new(session)),
        ))
    }
}

#[async_trait]
impl FromAppState for GetPublicProfileInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let session = SqlxSession::new_lazy(state.pool.clone());
        Ok(GetPublicProfileInteractor::new(Arc::new(ProfileGateway::new(session))))
    }
}

/// Draft interactors that only need the registry and a profile reader.
macro_rules! draft_interactor_from_app_state {
    ($($interactor:ident),* $(,)?) => {
        $(
            #[async_trait]
            impl FromAppState for $interactor {
                async fn from_app_state(state: &AppState) -> AppResult<Self> {
                    let session = SqlxSession::new_lazy(state.pool.clone());
                    Ok($interactor::new(state.draft_context(&session)))
                }
            }
        )*
    };
}

draft_interactor_from_app_state!(
    OpenDraftInteractor,
    EditDraftInteractor,
    MoveSectionInteractor,
    RemoveSectionInteractor,
    AddCustomSectionInteractor,
    SetSectionVisibilityInteractor,
    DiscardDraftInteractor,
);

#[async_trait]
impl FromAppState for SaveDraftInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let session = SqlxSession::new_lazy(state.pool.clone());
        Ok(SaveDraftInteractor::new(
            state.draft_context(&session),
            Arc::new(session.clone()),
            Arc::new(ProfileGateway::new(session)),
            state.storage.clone(),
        ))
    }
}

#[async_trait]
impl FromAppState for UploadProfileImageInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let session = SqlxSession::new_lazy(state.pool.clone());
        Ok(UploadProfileImageInteractor::new(
            state.draft_context(&session),
            state.storage.clone(),
            state.inspector.clone(),
        ))
    }
}

#[async_trait]
impl FromAppState for UploadSectionMediaInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let session = SqlxSession::new_lazy(state.pool.clone());
        Ok(UploadSectionMediaInteractor::new(
            state.draft_context(&session),
            state.storage.clone(),
            state.inspector.clone(),
        ))
    }
}

#[async_trait]
impl FromAppState for DeleteSectionMediaInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let session = SqlxSession::new_lazy(state.pool.clone());
        Ok(DeleteSectionMediaInteractor::new(
            state.draft_context(&session),
            state.storage.clone(),
        ))
    }
}

/// Lets handlers take any interactor as an extractor.
macro_rules! interactor_from_request_parts {
    ($($interactor:ident),* $(,)?) => {
        $(
            impl<S> FromRequestParts<S> for $interactor
            where
                S: Send + Sync,
                AppState: FromRef<S>,
            {
                type Rejection = AppError;

                async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
                    let app_state = AppState::from_ref(state);
                    $interactor::from_app_state(&app_state).await
                }
            }
        )*
    };
}

interactor_from_request_parts!(
    SignUpInteractor,
    SignInInteractor,
    SignOutInteractor,
    GetCurrentIdentityInteractor,
    ValidateSessionInteractor,
    GetPublicProfileInteractor,
    OpenDraftInteractor,
    EditDraftInteractor,
    MoveSectionInteractor,
    RemoveSectionInteractor,
    AddCustomSectionInteractor,
    SetSectionVisibilityInteractor,
    DiscardDraftInteractor,
    SaveDraftInteractor,
    UploadProfileImageInteractor,
    UploadSectionMediaInteractor,
    DeleteSectionMediaInteractor,
);
