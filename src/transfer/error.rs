//! Transfer Error Types
//!
//! Messages of the three settlement rejections double as the failure reason
//! written to the audit record.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::StorageError;
use crate::validation::Violations;

/// Transfer error types
#[derive(Error, Debug, Clone)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Validation failed: {0}")]
    Validation(Violations),

    #[error("Invalid transfer id")]
    InvalidId,

    #[error("Invalid account id")]
    InvalidAccount,

    // === Business Rule Errors ===
    #[error("Amount exceeds the transfer ceiling of {ceiling}")]
    AmountTooLarge { ceiling: Decimal },

    #[error("Source account not found")]
    SourceAccountNotFound,

    #[error("Destination account not found")]
    DestinationAccountNotFound,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Amount would cause overflow")]
    Overflow,

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    // === Lookup Errors ===
    #[error("Account not found")]
    AccountNotFound,

    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    // === System Errors ===
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TransferError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::Validation(_) => "VALIDATION_FAILED",
            TransferError::InvalidId => "INVALID_ID",
            TransferError::InvalidAccount => "INVALID_ACCOUNT",
            TransferError::AmountTooLarge { .. } => "AMOUNT_TOO_LARGE",
            TransferError::SourceAccountNotFound => "SOURCE_ACCOUNT_NOT_FOUND",
            TransferError::DestinationAccountNotFound => "DESTINATION_ACCOUNT_NOT_FOUND",
            TransferError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            TransferError::Overflow => "OVERFLOW",
            TransferError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            TransferError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            TransferError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            TransferError::Storage(StorageError::Conflict(_)) => "CONFLICT",
            TransferError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::Validation(_)
            | TransferError::InvalidId
            | TransferError::InvalidAccount => 400,
            TransferError::AmountTooLarge { .. }
            | TransferError::SourceAccountNotFound
            | TransferError::DestinationAccountNotFound
            | TransferError::InsufficientBalance
            | TransferError::Overflow
            | TransferError::InvalidStateTransition(_) => 422,
            TransferError::AccountNotFound | TransferError::TransferNotFound(_) => 404,
            TransferError::Storage(StorageError::Conflict(_)) => 409,
            TransferError::Storage(_) => 500,
        }
    }

    /// Rejections discovered inside the settlement section; these are audited
    pub fn is_settlement_rejection(&self) -> bool {
        matches!(
            self,
            TransferError::SourceAccountNotFound
                | TransferError::DestinationAccountNotFound
                | TransferError::InsufficientBalance
                | TransferError::Overflow
        )
    }

    /// Field violations carried by a validation error
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            TransferError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Violations> for TransferError {
    fn from(v: Violations) -> Self {
        TransferError::Validation(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TransferError::InsufficientBalance.code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(
            TransferError::DestinationAccountNotFound.code(),
            "DESTINATION_ACCOUNT_NOT_FOUND"
        );
        assert_eq!(
            TransferError::Storage(StorageError::Conflict("v".into())).code(),
            "CONFLICT"
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(TransferError::InvalidId.http_status(), 400);
        assert_eq!(
            TransferError::Validation(Violations::single("amount", "bad")).http_status(),
            400
        );
        assert_eq!(
            TransferError::AmountTooLarge {
                ceiling: Decimal::from(10_000)
            }
            .http_status(),
            422
        );
        assert_eq!(TransferError::InsufficientBalance.http_status(), 422);
        assert_eq!(TransferError::TransferNotFound("x".into()).http_status(), 404);
        assert_eq!(
            TransferError::Storage(StorageError::Conflict("v".into())).http_status(),
            409
        );
        assert_eq!(
            TransferError::Storage(StorageError::Database("down".into())).http_status(),
            500
        );
    }

    #[test]
    fn test_display_is_audit_reason() {
        assert_eq!(
            TransferError::InsufficientBalance.to_string(),
            "Insufficient balance"
        );
        assert_eq!(
            TransferError::SourceAccountNotFound.to_string(),
            "Source account not found"
        );
        assert_eq!(
            TransferError::AmountTooLarge {
                ceiling: Decimal::from(10_000)
            }
            .to_string(),
            "Amount exceeds the transfer ceiling of 10000"
        );
    }

    #[test]
    fn test_settlement_rejections() {
        assert!(TransferError::InsufficientBalance.is_settlement_rejection());
        assert!(!TransferError::InvalidId.is_settlement_rejection());
        assert!(
            !TransferError::AmountTooLarge {
                ceiling: Decimal::ONE
            }
            .is_settlement_rejection()
        );
    }
}
