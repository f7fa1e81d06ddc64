//! Transfer lifecycle operations
//!
//! Reads, cancel and delete. None of these move balances, so none of them
//! take the settlement lock.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::core_types::{AccountId, TransferId};
use crate::store::Ledger;

use super::error::TransferError;
use super::types::Transfer;

pub struct TransferService {
    ledger: Arc<dyn Ledger>,
}

impl TransferService {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// All records, transfer date descending then id descending
    pub async fn list(&self) -> Result<Vec<Transfer>, TransferError> {
        let mut uow = self.ledger.begin().await?;
        Ok(uow.transfers().list_all().await?)
    }

    pub async fn get(&self, id: TransferId) -> Result<Transfer, TransferError> {
        if id.is_nil() {
            return Err(TransferError::InvalidId);
        }
        let mut uow = self.ledger.begin().await?;
        uow.transfers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| TransferError::TransferNotFound(id.to_string()))
    }

    /// Records where the account is source or destination
    ///
    /// An empty history is only an error when the account itself is unknown.
    pub async fn history(&self, account_id: AccountId) -> Result<Vec<Transfer>, TransferError> {
        if account_id.is_nil() {
            return Err(TransferError::InvalidAccount);
        }
        let mut uow = self.ledger.begin().await?;
        let history = uow.transfers().history_by_account(account_id).await?;
        if history.is_empty() && uow.accounts().get_by_id(account_id).await?.is_none() {
            return Err(TransferError::AccountNotFound);
        }
        debug!(account_id = %account_id, records = history.len(), "History loaded");
        Ok(history)
    }

    /// Mark a settled transfer CANCELLED
    ///
    /// Balances are left as settled. Cancelling a cancelled record succeeds
    /// without writing; a FAILURE record cannot be cancelled.
    pub async fn cancel(&self, id: TransferId) -> Result<bool, TransferError> {
        if id.is_nil() {
            return Err(TransferError::InvalidId);
        }
        let mut uow = self.ledger.begin().await?;
        let mut transfer = uow
            .transfers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| TransferError::TransferNotFound(id.to_string()))?;

        if transfer.cancel(Utc::now())? {
            uow.transfers().update(&transfer).await?;
            uow.commit().await?;
            info!(transfer_id = %id, "Transfer cancelled");
        } else {
            debug!(transfer_id = %id, "Transfer already cancelled");
        }
        Ok(true)
    }

    /// Remove the record entirely
    pub async fn delete(&self, id: TransferId) -> Result<(), TransferError> {
        if id.is_nil() {
            return Err(TransferError::InvalidId);
        }
        let mut uow = self.ledger.begin().await?;
        if uow.transfers().get_by_id(id).await?.is_none() {
            return Err(TransferError::TransferNotFound(id.to_string()));
        }
        uow.transfers().delete(id).await?;
        uow.commit().await?;
        info!(transfer_id = %id, "Transfer deleted");
        Ok(())
    }
}
