use crate::application::dto::auth::IdentityDTO;

#[derive(Debug)]
pub struct SessionDTO {
    pub id: String,
    pub default_max_lifetime: i64,
    pub default_idle_timeout: i64,
    pub remembered_max_lifetime: i64,
    pub remembered_idle_timeout: i64,
}

#[derive(Debug, Clone)]
pub enum SessionValidationResult {
    Valid(IdentityDTO),
    Expired,
    Invalid,
}
