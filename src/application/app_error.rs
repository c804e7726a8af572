use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::header::InvalidHeaderValue;
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::entities::handle::HandleError;
use crate::domain::entities::profile::ProfileError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Invalid Credentials")]
    InvalidCredentials,

    #[error("Access denied")]
    AccessDenied,

    #[error("Password hashing failed")]
    PasswordHashError,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Handle is already taken")]
    HandleTaken,

    #[error("Invalid handle: {0}")]
    InvalidHandle(#[from] HandleError),

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(ProfileError),

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid field `{field}`: {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Invalid multipart payload: {0}")]
    InvalidMultipart(#[from] MultipartError),

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("Unsupported media type")]
    UnsupportedMediaType,

    #[error("Payload exceeds the limit of {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Image decoding failed: {0}")]
    ImageDecodeError(String),

    #[error("Upload failed: {0}")]
    UploadError(String),

    #[error("Persistence failed: {0}")]
    PersistenceError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

impl AppError {
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        AppError::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::SectionNotFound(section_id) => AppError::SectionNotFound(section_id),
            other => AppError::InvalidProfile(other),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
