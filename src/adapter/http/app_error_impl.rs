use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::application::app_error::AppError;

pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Messages per request field, for inline display next to the inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn collect_field_errors(errors: &ValidationErrors, field: Option<&str>, out: &mut FieldErrors) {
    for (name, kind) in errors.errors() {
        // Nested value objects report under the field that holds them.
        let key = field.map(str::to_string).unwrap_or_else(|| camel_case(name));
        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = out.entry(key).or_default();
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(inner, Some(&key), out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect_field_errors(inner, Some(&key), out);
                }
            }
        }
    }
}

fn single_field(field: &str, message: String) -> Option<FieldErrors> {
    Some(BTreeMap::from([(field.to_string(), vec![message])]))
}

impl AppError {
    fn status_and_fields(&self) -> (StatusCode, Option<FieldErrors>) {
        match self {
            AppError::InvalidId(_) => (StatusCode::BAD_REQUEST, None),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, None),
            AppError::AccessDenied => (StatusCode::FORBIDDEN, None),
            AppError::ProfileNotFound | AppError::SectionNotFound(_) => (StatusCode::NOT_FOUND, None),
            AppError::EmailTaken => (StatusCode::CONFLICT, single_field("email", self.to_string())),
            AppError::HandleTaken => (StatusCode::CONFLICT, single_field("handle", self.to_string())),
            AppError::SaveInProgress => (StatusCode::CONFLICT, None),
            AppError::InvalidHandle(err) => (StatusCode::UNPROCESSABLE_ENTITY, single_field("handle", err.to_string())),
            AppError::InvalidProfile(err) => (StatusCode::UNPROCESSABLE_ENTITY, single_field(err.field(), err.to_string())),
            AppError::InvalidField { field, message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, single_field(field, message.clone()))
            }
            AppError::ImageDecodeError(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                single_field("file", "File is not a readable image".to_string()),
            ),
            AppError::Validation(errors) => {
                let mut fields = FieldErrors::new();
                collect_field_errors(errors, None, &mut fields);
                (StatusCode::UNPROCESSABLE_ENTITY, Some(fields))
            }
            AppError::InvalidBody(rejection) => (rejection.status(), None),
            AppError::InvalidMultipart(rejection) => (rejection.status(), None),
            AppError::UnsupportedMediaType => (StatusCode::UNSUPPORTED_MEDIA_TYPE, None),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, None),
            AppError::UploadError(_) => (StatusCode::BAD_GATEWAY, None),
            AppError::PersistenceError(_) | AppError::DatabaseError(sqlx::Error::PoolTimedOut) => {
                (StatusCode::SERVICE_UNAVAILABLE, None)
            }
            AppError::PasswordHashError | AppError::DatabaseError(_) | AppError::InvalidHeader(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        }
    }

    /// Text shown to the client; server side failures only expose a generic message.
    fn public_message(&self, status: StatusCode) -> String {
        match self {
            AppError::InvalidProfile(_)
            | AppError::InvalidField { .. }
            | AppError::InvalidHandle(_)
            | AppError::Validation(_)
            | AppError::ImageDecodeError(_) => "Validation failed".to_string(),
            AppError::InvalidBody(rejection) => rejection.body_text(),
            AppError::InvalidMultipart(rejection) => rejection.body_text(),
            AppError::PersistenceError(_) => "Failed to persist changes, unsaved edits are kept".to_string(),
            AppError::UploadError(_) => "Upload to media storage failed".to_string(),
            _ if status.is_server_error() => status.canonical_reason().unwrap_or("Unknown error").to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, fields) = self.status_and_fields();
        if status.is_server_error() {
            error!("{}: {:?}", status, self);
        }

        let body = Json(ErrorResponse {
            error: self.public_message(status),
            fields,
        });
        (status, body).into_response()
    }
}
