use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const HANDLE_MIN_LEN: usize = 3;
pub const HANDLE_MAX_LEN: usize = 20;

/// Path segments served by the API itself; a profile under one of them would be unreachable.
const RESERVED_HANDLES: &[&str] = &["api", "auth", "docs", "openapi", "profiles", "static"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("Handle must be between {HANDLE_MIN_LEN} and {HANDLE_MAX_LEN} characters")]
    Length,
    #[error("Handle may only contain letters, digits and '-'")]
    Characters,
    #[error("Handle must not start or end with '-'")]
    EdgeHyphen,
    #[error("Handle must not contain consecutive '-'")]
    ConsecutiveHyphens,
    #[error("Handle is reserved")]
    Reserved,
}

/// Public, URL-safe key of a profile document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    pub fn parse(value: &str) -> Result<Self, HandleError> {
        let len = value.chars().count();
        if !(HANDLE_MIN_LEN..=HANDLE_MAX_LEN).contains(&len) {
            return Err(HandleError::Length);
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(HandleError::Characters);
        }
        if value.starts_with('-') || value.ends_with('-') {
            return Err(HandleError::EdgeHyphen);
        }
        if value.contains("--") {
            return Err(HandleError::ConsecutiveHyphens);
        }
        if RESERVED_HANDLES.iter().any(|r| r.eq_ignore_ascii_case(value)) {
            return Err(HandleError::Reserved);
        }
        Ok(Handle(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Handle {
    type Error = HandleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Handle::parse(&value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
