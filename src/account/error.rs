//! Account Error Types

use thiserror::Error;

use crate::store::StorageError;
use crate::validation::Violations;

#[derive(Error, Debug, Clone)]
pub enum AccountError {
    #[error("Validation failed: {0}")]
    Validation(Violations),

    #[error("Invalid account id")]
    InvalidId,

    #[error("Invalid account number")]
    InvalidAccountNumber,

    #[error("Account id in path does not match the request body")]
    IdMismatch,

    #[error("Account not found")]
    NotFound,

    #[error("Account number already in use: {0}")]
    NumberInUse(String),

    #[error("Account is referenced by transfers")]
    Referenced,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AccountError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::Validation(_) => "VALIDATION_FAILED",
            AccountError::InvalidId => "INVALID_ID",
            AccountError::InvalidAccountNumber => "INVALID_ACCOUNT_NUMBER",
            AccountError::IdMismatch => "ID_MISMATCH",
            AccountError::NotFound => "ACCOUNT_NOT_FOUND",
            AccountError::NumberInUse(_) => "ACCOUNT_NUMBER_IN_USE",
            AccountError::Referenced => "ACCOUNT_REFERENCED",
            AccountError::Storage(StorageError::Conflict(_)) => "CONFLICT",
            AccountError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            AccountError::Validation(_)
            | AccountError::InvalidId
            | AccountError::InvalidAccountNumber
            | AccountError::IdMismatch => 400,
            AccountError::NotFound => 404,
            AccountError::NumberInUse(_) | AccountError::Referenced => 422,
            AccountError::Storage(StorageError::Conflict(_)) => 409,
            AccountError::Storage(_) => 500,
        }
    }

    pub fn violations(&self) -> Option<&Violations> {
        match self {
            AccountError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Violations> for AccountError {
    fn from(v: Violations) -> Self {
        AccountError::Validation(v)
    }
}
