use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use crate::application::app_error::AppResult;
use crate::application::dto::auth::IdentityDTO;
use crate::application::dto::session::{SessionDTO, SessionValidationResult};
use crate::application::interface::db::DBSession;
use crate::application::interface::gateway::session::{SessionReader, SessionWriter};
use crate::application::interface::gateway::user::UserReader;
use crate::domain::entities::id::Id;
use crate::domain::entities::session::{Session, SessionLimits};

#[derive(Clone)]
pub struct ValidateSessionInteractor {
    db_session: Arc<dyn DBSession>,
    session_reader: Arc<dyn SessionReader>,
    session_writer: Arc<dyn SessionWriter>,
    user_reader: Arc<dyn UserReader>,
}

impl ValidateSessionInteractor {
    pub fn new(
        db_session: Arc<dyn DBSession>,
        session_reader: Arc<dyn SessionReader>,
        session_writer: Arc<dyn SessionWriter>,
        user_reader: Arc<dyn UserReader>,
    ) -> Self {
        Self {
            db_session,
            session_reader,
            session_writer,
            user_reader,
        }
    }

    fn limits(dto: &SessionDTO, remember_me: bool) -> SessionLimits {
        if remember_me {
            return SessionLimits {
                max_lifetime: Duration::seconds(dto.remembered_max_lifetime),
                idle_timeout: Duration::seconds(dto.remembered_idle_timeout),
            };
        }
        SessionLimits {
            max_lifetime: Duration::seconds(dto.default_max_lifetime),
            idle_timeout: Duration::seconds(dto.default_idle_timeout),
        }
    }

    /// Resolves a session cookie to the signed-in identity, refreshing its activity time.
    pub async fn execute(&self, dto: SessionDTO) -> AppResult<SessionValidationResult> {
        let session_id: Id<Session> = match dto.id.clone().try_into() {
            Ok(id) => id,
            Err(_) => return Ok(SessionValidationResult::Invalid),
        };
        let Some(session) = self.session_reader.find_by_id(&session_id).await? else {
            return Ok(SessionValidationResult::Invalid);
        };

        let now = Utc::now();
        if session.is_expired(Self::limits(&dto, session.remember_me), now) {
            self.session_writer.delete(&session_id).await?;
            self.db_session.commit().await?;
            info!("Session {} expired", session_id);
            return Ok(SessionValidationResult::Expired);
        }

        let Some(user) = self.user_reader.find_by_id(&session.user_id).await? else {
            return Ok(SessionValidationResult::Invalid);
        };
        self.session_writer.update_activity(&session_id, now).await?;
        self.db_session.commit().await?;
        Ok(SessionValidationResult::Valid(IdentityDTO::from(&user)))
    }
}
