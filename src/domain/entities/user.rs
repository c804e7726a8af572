use chrono::{DateTime, Utc};

use crate::domain::entities::handle::Handle;
use crate::domain::entities::id::Id;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Id<User>,
    pub email: String,
    pub display_name: String,
    pub handle: Handle,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, display_name: String, handle: Handle, password: String) -> Self {
        let now = Utc::now();
        Self {
            id: Id::generate(),
            email,
            display_name,
            handle,
            password,
            created_at: now,
            updated_at: now,
        }
    }
}
