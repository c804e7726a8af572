use crate::domain::entities::user::User;

#[derive(Debug)]
pub struct SignUpDTO {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub handle: String,
    pub remember_me: bool,
}

#[derive(Debug)]
pub struct SignInDTO {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityDTO {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub handle: String,
}

impl From<&User> for IdentityDTO {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.value.to_string(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            handle: user.handle.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignedInDTO {
    pub session_id: String,
    pub remember_me: bool,
    pub identity: IdentityDTO,
}

#[derive(Debug, Clone)]
pub struct SignOutDTO {
    pub user_id: String,
    pub handle: String,
}
