//! Account query surface and administrative CRUD
//!
//! Runs outside the settlement lock. Concurrent settlements are protected by
//! the optimistic version check on every account save.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::core_types::AccountId;
use crate::store::Ledger;

use super::error::AccountError;
use super::models::Account;
use super::validation::{AccountUpdate, NewAccount, check_account_update, check_new_account};

pub struct AccountService {
    ledger: Arc<dyn Ledger>,
}

impl AccountService {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    pub async fn list(&self) -> Result<Vec<Account>, AccountError> {
        let mut uow = self.ledger.begin().await?;
        Ok(uow.accounts().list_all().await?)
    }

    pub async fn get(&self, id: AccountId) -> Result<Account, AccountError> {
        if id.is_nil() {
            return Err(AccountError::InvalidId);
        }
        let mut uow = self.ledger.begin().await?;
        uow.accounts()
            .get_by_id(id)
            .await?
            .ok_or(AccountError::NotFound)
    }

    pub async fn get_by_number(&self, number: &str) -> Result<Account, AccountError> {
        if number.trim().is_empty() {
            return Err(AccountError::InvalidAccountNumber);
        }
        let mut uow = self.ledger.begin().await?;
        uow.accounts()
            .get_by_number(number)
            .await?
            .ok_or(AccountError::NotFound)
    }

    pub async fn create(&self, req: NewAccount) -> Result<Account, AccountError> {
        check_new_account(&req)?;

        let mut uow = self.ledger.begin().await?;
        if uow
            .accounts()
            .get_by_number(&req.account_number)
            .await?
            .is_some()
        {
            return Err(AccountError::NumberInUse(req.account_number));
        }

        let account = Account::open(req.name, req.account_number, req.balance);
        uow.accounts().insert(&account).await?;
        uow.commit().await?;

        info!(account_id = %account.id, number = %account.account_number, "Account created");
        Ok(account)
    }

    /// Overwrite holder data, including the balance
    ///
    /// Returns the account as stored, with its new version.
    pub async fn update(&self, id: AccountId, req: AccountUpdate) -> Result<Account, AccountError> {
        if id.is_nil() {
            return Err(AccountError::InvalidId);
        }
        if req.id != id {
            return Err(AccountError::IdMismatch);
        }
        check_account_update(&req)?;

        let mut uow = self.ledger.begin().await?;
        let mut account = uow
            .accounts()
            .get_by_id(id)
            .await?
            .ok_or(AccountError::NotFound)?;

        if account.account_number != req.account_number
            && let Some(holder) = uow.accounts().get_by_number(&req.account_number).await?
            && holder.id != id
        {
            return Err(AccountError::NumberInUse(req.account_number));
        }

        account.apply_update(req.name, req.account_number, req.balance, Utc::now());
        uow.accounts().save(&account).await?;
        uow.commit().await?;
        account.version += 1;

        info!(account_id = %id, version = account.version, "Account updated");
        Ok(account)
    }

    /// Remove an account no transfer record refers to
    pub async fn delete(&self, id: AccountId) -> Result<(), AccountError> {
        if id.is_nil() {
            return Err(AccountError::InvalidId);
        }
        let mut uow = self.ledger.begin().await?;
        if uow.accounts().get_by_id(id).await?.is_none() {
            return Err(AccountError::NotFound);
        }
        if uow.transfers().references_account(id).await? {
            return Err(AccountError::Referenced);
        }
        uow.accounts().delete(id).await?;
        uow.commit().await?;

        info!(account_id = %id, "Account deleted");
        Ok(())
    }
}
