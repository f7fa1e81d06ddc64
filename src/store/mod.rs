//! Ledger storage contracts
//!
//! The services never talk to a database directly. They open a
//! [`UnitOfWork`] from a [`Ledger`], read and stage changes through its two
//! repositories, and finish with a single [`UnitOfWork::commit`] so that
//! balance mutations and audit records land together or not at all.
//!
//! A unit of work dropped without commit discards everything it staged.
//!
//! # Implementations
//! - [`memory::MemoryLedger`] - process-local tables, used by tests and the
//!   default dev profile
//! - [`postgres::PgLedger`] - one PostgreSQL transaction per unit of work

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::account::Account;
use crate::core_types::{AccountId, TransferId};
use crate::transfer::Transfer;

pub use memory::MemoryLedger;
pub use postgres::PgLedger;

/// Storage failures
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    /// Optimistic version check or uniqueness constraint failed at commit
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// An update or delete named a row that does not exist
    #[error("Record missing: {0}")]
    Missing(String),

    /// A stored row could not be decoded
    #[error("Corrupted record: {0}")]
    Corrupted(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StorageError::Conflict(db.message().to_string())
            }
            _ => StorageError::Database(e.to_string()),
        }
    }
}

/// Point lookups and staged writes for holder accounts
#[async_trait]
pub trait AccountRepository: Send {
    async fn get_by_id(&mut self, id: AccountId) -> Result<Option<Account>, StorageError>;

    async fn get_by_number(&mut self, number: &str) -> Result<Option<Account>, StorageError>;

    async fn list_all(&mut self) -> Result<Vec<Account>, StorageError>;

    async fn insert(&mut self, account: &Account) -> Result<(), StorageError>;

    /// Stage an update. The stored version must equal `account.version`.
    async fn save(&mut self, account: &Account) -> Result<(), StorageError>;

    async fn delete(&mut self, id: AccountId) -> Result<(), StorageError>;
}

/// Audit record lookups and staged writes
#[async_trait]
pub trait TransferRepository: Send {
    async fn get_by_id(&mut self, id: TransferId) -> Result<Option<Transfer>, StorageError>;

    /// All records, transfer date descending then id descending
    async fn list_all(&mut self) -> Result<Vec<Transfer>, StorageError>;

    /// Records where the account is source or destination, ordered like
    /// [`TransferRepository::list_all`]
    async fn history_by_account(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<Transfer>, StorageError>;

    async fn insert(&mut self, transfer: &Transfer) -> Result<(), StorageError>;

    async fn update(&mut self, transfer: &Transfer) -> Result<(), StorageError>;

    async fn delete(&mut self, id: TransferId) -> Result<(), StorageError>;

    /// True if any record names the account as source or destination
    async fn references_account(&mut self, account_id: AccountId) -> Result<bool, StorageError>;
}

/// One logical attempt against the ledger
#[async_trait]
pub trait UnitOfWork: Send {
    fn accounts(&mut self) -> &mut dyn AccountRepository;

    fn transfers(&mut self) -> &mut dyn TransferRepository;

    /// Persist every staged change as one unit and return how many changed
    async fn commit(self: Box<Self>) -> Result<usize, StorageError>;
}

/// Factory for units of work, shared by every caller
#[async_trait]
pub trait Ledger: Send + Sync {
    fn name(&self) -> &'static str;

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StorageError>;
}

/// Shared transfer ordering: transfer date descending, then id descending
pub(crate) fn history_order(a: &Transfer, b: &Transfer) -> std::cmp::Ordering {
    b.transfer_date()
        .cmp(&a.transfer_date())
        .then_with(|| b.id().cmp(&a.id()))
}
