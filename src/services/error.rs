use std::collections::HashMap;
use thiserror::Error;

use crate::auth::AuthError;
use crate::database::manager::DatabaseError;

/// Domain outcomes of user, panel and gate operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid input")]
    Validation(HashMap<String, String>),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("Admins cannot remove their own admin role")]
    SelfRoleChangeForbidden,

    #[error("Admins cannot delete their own account")]
    SelfDeleteForbidden,

    #[error("No fields to update")]
    NoOp,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ServiceError::Unauthenticated(message.into())
    }

    /// Single-field validation failure
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.into());
        ServiceError::Validation(field_errors)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
