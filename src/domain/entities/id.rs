use crate::application::app_error::AppError;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug)]
pub struct Id<T> {
    pub value: Uuid,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: Uuid) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn generate() -> Id<T> {
        Id::new(Uuid::now_v7())
    }
}

// Manual impls: a derive would demand `T: Clone`/`T: PartialEq` of the marker type.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Id::new(self.value)
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let uuid = Uuid::from_str(&value).map_err(|e| AppError::InvalidId(format!("Invalid UUID: {}", e)))?;
        Ok(Id::new(uuid))
    }
}
