use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_email::Email;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::adapter::http::schema::ValidPassword;
use crate::application::dto::auth::IdentityDTO;
use crate::domain::entities::handle::Handle;

const DISPLAY_NAME_MAX_LEN: usize = 50;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[schema(value_type = String, format = "email")]
    pub email: Email,
    #[validate(nested)]
    pub password: ValidPassword,
    #[validate(custom(function = "valid_display_name"))]
    pub display_name: String,
    #[validate(custom(function = "valid_handle"))]
    pub handle: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[schema(value_type = String, format = "email")]
    pub email: Email,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub handle: String,
}

impl From<IdentityDTO> for IdentityResponse {
    fn from(dto: IdentityDTO) -> Self {
        Self {
            id: dto.user_id,
            email: dto.email,
            display_name: dto.display_name,
            handle: dto.handle,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn valid_display_name(display_name: &str) -> Result<(), ValidationError> {
    let len = display_name.trim().chars().count();
    if (1..=DISPLAY_NAME_MAX_LEN).contains(&len) {
        return Ok(());
    }
    Err(ValidationError::new("display_name_length").with_message(Cow::Borrowed(
        "Display name must be between 1 and 50 characters",
    )))
}

fn valid_handle(handle: &str) -> Result<(), ValidationError> {
    Handle::parse(handle)
        .map(|_| ())
        .map_err(|e| ValidationError::new("handle").with_message(Cow::Owned(e.to_string())))
}
