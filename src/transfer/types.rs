//! Transfer Core Types

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::core_types::{AccountId, TransferId};

use super::error::TransferError;
use super::state::TransferStatus;

/// Transfer intent submitted by a caller
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: Decimal,
    /// Requested settlement date; must not precede submission
    pub transfer_date: DateTime<Utc>,
    /// Moment the caller submitted the request
    pub submitted_at: DateTime<Utc>,
}

impl TransferRequest {
    pub fn new(
        source_account_id: AccountId,
        destination_account_id: AccountId,
        amount: Decimal,
        transfer_date: DateTime<Utc>,
    ) -> Self {
        Self {
            source_account_id,
            destination_account_id,
            amount,
            transfer_date,
            submitted_at: Utc::now(),
        }
    }

    /// Pin the submission instant, e.g. the instant a gateway received the body
    pub fn submitted(mut self, at: DateTime<Utc>) -> Self {
        self.submitted_at = at;
        self
    }

    #[inline]
    pub fn is_self_transfer(&self) -> bool {
        self.source_account_id == self.destination_account_id
    }
}

/// Audit record of one transfer attempt
///
/// The settlement tuple (source, destination, amount, transfer date) is
/// fixed at creation; only the status moves afterwards, via [`Transfer::cancel`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    id: TransferId,
    source_account_id: AccountId,
    destination_account_id: AccountId,
    amount: Decimal,
    transfer_date: DateTime<Utc>,
    status: TransferStatus,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Transfer {
    /// Record of a settled attempt
    pub fn settled(req: &TransferRequest, now: DateTime<Utc>) -> Self {
        Self::attempt(req, TransferStatus::Success, now)
    }

    /// Record of a rejected attempt
    pub fn failed(req: &TransferRequest, reason: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::attempt(
            req,
            TransferStatus::Failure {
                reason: reason.into(),
            },
            now,
        )
    }

    fn attempt(req: &TransferRequest, status: TransferStatus, now: DateTime<Utc>) -> Self {
        Self {
            id: TransferId::new(),
            source_account_id: req.source_account_id,
            destination_account_id: req.destination_account_id,
            amount: req.amount,
            transfer_date: req.transfer_date,
            status,
            created_at: now,
            updated_at: None,
        }
    }

    /// Rebuild a record read back from storage
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: TransferId,
        source_account_id: AccountId,
        destination_account_id: AccountId,
        amount: Decimal,
        transfer_date: DateTime<Utc>,
        status: TransferStatus,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            source_account_id,
            destination_account_id,
            amount,
            transfer_date,
            status,
            created_at,
            updated_at,
        }
    }

    /// Move SUCCESS → CANCELLED
    ///
    /// Returns `Ok(false)` when the record is already cancelled (nothing to
    /// persist). Balances are never touched here.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<bool, TransferError> {
        if self.status == TransferStatus::Cancelled {
            return Ok(false);
        }
        if !self.status.can_cancel() {
            return Err(TransferError::InvalidStateTransition(format!(
                "transfer {} is {} and cannot be cancelled",
                self.id, self.status
            )));
        }
        self.status = TransferStatus::Cancelled;
        self.updated_at = Some(now);
        Ok(true)
    }

    #[inline]
    pub fn id(&self) -> TransferId {
        self.id
    }

    #[inline]
    pub fn source_account_id(&self) -> AccountId {
        self.source_account_id
    }

    #[inline]
    pub fn destination_account_id(&self) -> AccountId {
        self.destination_account_id
    }

    #[inline]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    #[inline]
    pub fn transfer_date(&self) -> DateTime<Utc> {
        self.transfer_date
    }

    #[inline]
    pub fn status(&self) -> &TransferStatus {
        &self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.status.error_message()
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// True if the account is source or destination
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.source_account_id == account_id || self.destination_account_id == account_id
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer[{}] {} -> {} amount={} status={}",
            self.id, self.source_account_id, self.destination_account_id, self.amount, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TransferRequest {
        TransferRequest::new(
            AccountId::new(),
            AccountId::new(),
            Decimal::from(500),
            Utc::now(),
        )
    }

    #[test]
    fn test_settled_record() {
        let req = request();
        let now = Utc::now();
        let t = Transfer::settled(&req, now);
        assert_eq!(t.status(), &TransferStatus::Success);
        assert_eq!(t.amount(), Decimal::from(500));
        assert_eq!(t.source_account_id(), req.source_account_id);
        assert_eq!(t.created_at(), now);
        assert!(t.error_message().is_none());
        assert!(t.updated_at().is_none());
    }

    #[test]
    fn test_failed_record_carries_reason() {
        let t = Transfer::failed(&request(), "Insufficient balance", Utc::now());
        assert_eq!(t.error_message(), Some("Insufficient balance"));
        assert_eq!(t.status().as_str(), "FAILURE");
    }

    #[test]
    fn test_cancel_success() {
        let mut t = Transfer::settled(&request(), Utc::now());
        let now = Utc::now();
        assert!(t.cancel(now).unwrap());
        assert_eq!(t.status(), &TransferStatus::Cancelled);
        assert_eq!(t.updated_at(), Some(now));
        // second cancel is a no-op
        assert!(!t.cancel(Utc::now()).unwrap());
    }

    #[test]
    fn test_cancel_failure_is_rejected() {
        let mut t = Transfer::failed(&request(), "Source account not found", Utc::now());
        let err = t.cancel(Utc::now()).unwrap_err();
        assert!(matches!(err, TransferError::InvalidStateTransition(_)));
        assert_eq!(t.error_message(), Some("Source account not found"));
    }

    #[test]
    fn test_involves() {
        let req = request();
        let t = Transfer::settled(&req, Utc::now());
        assert!(t.involves(req.source_account_id));
        assert!(t.involves(req.destination_account_id));
        assert!(!t.involves(AccountId::new()));
    }
}
