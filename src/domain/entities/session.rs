use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::id::Id;
use crate::domain::entities::user::User;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Id<Session>,
    pub user_id: Id<User>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub remember_me: bool,
}

/// Lifetime limits applied to a session; remembered sessions get their own pair.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
}

impl Session {
    pub fn start(user_id: Id<User>, remember_me: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Id::generate(),
            user_id,
            created_at: now,
            last_activity: now,
            remember_me,
        }
    }

    pub fn is_expired(&self, limits: SessionLimits, now: DateTime<Utc>) -> bool {
        now - self.created_at > limits.max_lifetime || now - self.last_activity > limits.idle_timeout
    }
}
