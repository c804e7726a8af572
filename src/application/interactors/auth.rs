use std::sync::Arc;

use tracing::{info, warn};

use crate::application::app_error::{AppError, AppResult};
use crate::application::drafts::DraftRegistry;
use crate::application::dto::auth::{IdentityDTO, SignInDTO, SignOutDTO, SignUpDTO, SignedInDTO};
use crate::application::interface::crypto::CredentialsHasher;
use crate::application::interface::db::DBSession;
use crate::application::interface::gateway::profile::{ProfileReader, ProfileWriter};
use crate::application::interface::gateway::session::SessionWriter;
use crate::application::interface::gateway::user::{UserReader, UserWriter};
use crate::domain::entities::handle::Handle;
use crate::domain::entities::id::Id;
use crate::domain::entities::profile::ProfileDocument;
use crate::domain::entities::session::Session;
use crate::domain::entities::user::User;

#[derive(Clone)]
pub struct SignUpInteractor {
    db_session: Arc<dyn DBSession>,
    user_reader: Arc<dyn UserReader>,
    user_writer: Arc<dyn UserWriter>,
    profile_reader: Arc<dyn ProfileReader>,
    profile_writer: Arc<dyn ProfileWriter>,
    session_writer: Arc<dyn SessionWriter>,
    hasher: Arc<dyn CredentialsHasher>,
}

impl SignUpInteractor {
    pub fn new(
        db_session: Arc<dyn DBSession>,
        user_reader: Arc<dyn UserReader>,
        user_writer: Arc<dyn UserWriter>,
        profile_reader: Arc<dyn ProfileReader>,
        profile_writer: Arc<dyn ProfileWriter>,
        session_writer: Arc<dyn SessionWriter>,
        hasher: Arc<dyn CredentialsHasher>,
    ) -> Self {
        Self {
            db_session,
            user_reader,
            user_writer,
            profile_reader,
            profile_writer,
            session_writer,
            hasher,
        }
    }

    /// Creates the user, claims the handle with a default profile and starts a session, all in
    /// one transaction.
    pub async fn execute(&self, dto: SignUpDTO) -> AppResult<SignedInDTO> {
        let handle = Handle::parse(&dto.handle)?;
        if self.user_reader.is_email_taken(&dto.email).await? {
            warn!("Signup attempt with registered email: {}", dto.email);
            return Err(AppError::EmailTaken);
        }
        if self.profile_reader.exists(&handle).await? {
            return Err(AppError::HandleTaken);
        }

        let password = self.hasher.hash_password(&dto.password).await?;
        let display_name = dto.display_name.trim().to_string();
        let user = User::new(dto.email, display_name.clone(), handle.clone(), password);
        let identity = IdentityDTO::from(&user);
        let user_id = self.user_writer.insert(user).await?;

        let document = ProfileDocument::new_default(handle.clone(), user_id.value.to_string(), &display_name);
        if !self.profile_writer.insert_if_absent(document).await? {
            warn!("Handle {} claimed concurrently", handle);
            self.db_session.rollback().await?;
            return Err(AppError::HandleTaken);
        }

        let session_id = self
            .session_writer
            .insert(Session::start(user_id, dto.remember_me))
            .await?;
        self.db_session.commit().await?;
        info!("User {} signed up with handle {}", identity.user_id, handle);

        Ok(SignedInDTO {
            session_id: session_id.value.to_string(),
            remember_me: dto.remember_me,
            identity,
        })
    }
}

#[derive(Clone)]
pub struct SignInInteractor {
    db_session: Arc<dyn DBSession>,
    user_reader: Arc<dyn UserReader>,
    session_writer: Arc<dyn SessionWriter>,
    hasher: Arc<dyn CredentialsHasher>,
}

impl SignInInteractor {
    pub fn new(
        db_session: Arc<dyn DBSession>,
        user_reader: Arc<dyn UserReader>,
        session_writer: Arc<dyn SessionWriter>,
        hasher: Arc<dyn CredentialsHasher>,
    ) -> Self {
        Self {
            db_session,
            user_reader,
            session_writer,
            hasher,
        }
    }

    pub async fn execute(&self, dto: SignInDTO) -> AppResult<SignedInDTO> {
        let user = self.user_reader.find_by_email(&dto.email).await?.ok_or_else(|| {
            warn!("Sign-in attempt with unknown email: {}", dto.email);
            AppError::InvalidCredentials
        })?;
        let is_valid = self.hasher.verify_password(&dto.password, &user.password).await?;
        if !is_valid {
            warn!("Invalid password for user: {}", user.handle);
            return Err(AppError::InvalidCredentials);
        }
        let identity = IdentityDTO::from(&user);
        let session_id = self
            .session_writer
            .insert(Session::start(user.id, dto.remember_me))
            .await?;
        self.db_session.commit().await?;
        info!("User {} signed in", identity.handle);
        Ok(SignedInDTO {
            session_id: session_id.value.to_string(),
            remember_me: dto.remember_me,
            identity,
        })
    }
}

#[derive(Clone)]
pub struct SignOutInteractor {
    db_session: Arc<dyn DBSession>,
    session_writer: Arc<dyn SessionWriter>,
    drafts: Arc<DraftRegistry>,
}

impl SignOutInteractor {
    pub fn new(
        db_session: Arc<dyn DBSession>,
        session_writer: Arc<dyn SessionWriter>,
        drafts: Arc<DraftRegistry>,
    ) -> Self {
        Self {
            db_session,
            session_writer,
            drafts,
        }
    }

    /// Ends every session of the user and drops their open draft.
    pub async fn execute(&self, dto: SignOutDTO) -> AppResult<()> {
        let user_id: Id<User> = dto.user_id.try_into()?;
        self.session_writer.delete_by_user_id(&user_id).await?;
        self.db_session.commit().await?;
        if self.drafts.remove(&dto.handle).await.is_some() {
            info!("Draft of {} discarded on sign-out", dto.handle);
        }
        info!("User {} signed out", user_id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct GetCurrentIdentityInteractor {
    user_reader: Arc<dyn UserReader>,
}

impl GetCurrentIdentityInteractor {
    pub fn new(user_reader: Arc<dyn UserReader>) -> Self {
        Self { user_reader }
    }

    pub async fn execute(&self, user_id: String) -> AppResult<Option<IdentityDTO>> {
        let user_id: Id<User> = user_id.try_into()?;
        let user = self.user_reader.find_by_id(&user_id).await?;
        Ok(user.as_ref().map(IdentityDTO::from))
    }
}
