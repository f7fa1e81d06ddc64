//! In-memory ledger
//!
//! Committed tables sit behind one `RwLock`. A unit of work stages its writes
//! in order and reads through them; commit replays the staged changes on a
//! copy of the tables under the write lock and swaps the copy in only if every
//! change applied cleanly.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::account::Account;
use crate::core_types::{AccountId, TransferId};
use crate::transfer::Transfer;

use super::{
    AccountRepository, Ledger, StorageError, TransferRepository, UnitOfWork, history_order,
};

#[derive(Debug, Clone, Default)]
struct LedgerTables {
    accounts: HashMap<AccountId, Account>,
    transfers: BTreeMap<TransferId, Transfer>,
}

#[derive(Debug)]
enum Change {
    InsertAccount(Account),
    SaveAccount(Account),
    DeleteAccount(AccountId),
    InsertTransfer(Transfer),
    UpdateTransfer(Transfer),
    DeleteTransfer(TransferId),
}

impl LedgerTables {
    fn number_taken(&self, number: &str, except: AccountId) -> bool {
        self.accounts
            .values()
            .any(|a| a.id != except && a.account_number == number)
    }

    fn apply(&mut self, change: &Change) -> Result<(), StorageError> {
        match change {
            Change::InsertAccount(account) => {
                if self.accounts.contains_key(&account.id) {
                    return Err(StorageError::Conflict(format!(
                        "account {} already exists",
                        account.id
                    )));
                }
                if self.number_taken(&account.account_number, account.id) {
                    return Err(StorageError::Conflict(format!(
                        "account number {} already in use",
                        account.account_number
                    )));
                }
                self.accounts.insert(account.id, account.clone());
            }
            Change::SaveAccount(account) => {
                let stored_version = self
                    .accounts
                    .get(&account.id)
                    .map(|a| a.version)
                    .ok_or_else(|| StorageError::Missing(format!("account {}", account.id)))?;
                if stored_version != account.version {
                    return Err(StorageError::Conflict(format!(
                        "account {} changed concurrently (version {} != {})",
                        account.id, account.version, stored_version
                    )));
                }
                if self.number_taken(&account.account_number, account.id) {
                    return Err(StorageError::Conflict(format!(
                        "account number {} already in use",
                        account.account_number
                    )));
                }
                let mut next = account.clone();
                next.version += 1;
                self.accounts.insert(next.id, next);
            }
            Change::DeleteAccount(id) => {
                self.accounts
                    .remove(id)
                    .ok_or_else(|| StorageError::Missing(format!("account {}", id)))?;
            }
            Change::InsertTransfer(transfer) => {
                if self.transfers.contains_key(&transfer.id()) {
                    return Err(StorageError::Conflict(format!(
                        "transfer {} already exists",
                        transfer.id()
                    )));
                }
                self.transfers.insert(transfer.id(), transfer.clone());
            }
            Change::UpdateTransfer(transfer) => {
                let slot = self
                    .transfers
                    .get_mut(&transfer.id())
                    .ok_or_else(|| StorageError::Missing(format!("transfer {}", transfer.id())))?;
                *slot = transfer.clone();
            }
            Change::DeleteTransfer(id) => {
                self.transfers
                    .remove(id)
                    .ok_or_else(|| StorageError::Missing(format!("transfer {}", id)))?;
            }
        }
        Ok(())
    }
}

/// Process-local ledger; clones share the same tables
#[derive(Clone, Default)]
pub struct MemoryLedger {
    tables: Arc<RwLock<LedgerTables>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StorageError> {
        Ok(Box::new(MemoryUnitOfWork {
            tables: self.tables.clone(),
            changes: Vec::new(),
        }))
    }
}

/// Staged writes over the shared tables
pub struct MemoryUnitOfWork {
    tables: Arc<RwLock<LedgerTables>>,
    changes: Vec<Change>,
}

impl MemoryUnitOfWork {
    /// Run `f` against the committed tables with this unit's changes applied
    async fn read<R>(&self, f: impl FnOnce(&LedgerTables) -> R + Send) -> R {
        let tables = self.tables.read().await;
        if self.changes.is_empty() {
            return f(&*tables);
        }
        let mut view = tables.clone();
        for change in &self.changes {
            // a change that cannot apply fails at commit; reads skip it
            let _ = view.apply(change);
        }
        f(&view)
    }
}

#[async_trait]
impl AccountRepository for MemoryUnitOfWork {
    async fn get_by_id(&mut self, id: AccountId) -> Result<Option<Account>, StorageError> {
        Ok(self.read(|t| t.accounts.get(&id).cloned()).await)
    }

    async fn get_by_number(&mut self, number: &str) -> Result<Option<Account>, StorageError> {
        Ok(self
            .read(|t| {
                t.accounts
                    .values()
                    .find(|a| a.account_number == number)
                    .cloned()
            })
            .await)
    }

    async fn list_all(&mut self) -> Result<Vec<Account>, StorageError> {
        let mut accounts = self
            .read(|t| t.accounts.values().cloned().collect::<Vec<_>>())
            .await;
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(accounts)
    }

    async fn insert(&mut self, account: &Account) -> Result<(), StorageError> {
        self.changes.push(Change::InsertAccount(account.clone()));
        Ok(())
    }

    async fn save(&mut self, account: &Account) -> Result<(), StorageError> {
        self.changes.push(Change::SaveAccount(account.clone()));
        Ok(())
    }

    async fn delete(&mut self, id: AccountId) -> Result<(), StorageError> {
        self.changes.push(Change::DeleteAccount(id));
        Ok(())
    }
}

#[async_trait]
impl TransferRepository for MemoryUnitOfWork {
    async fn get_by_id(&mut self, id: TransferId) -> Result<Option<Transfer>, StorageError> {
        Ok(self.read(|t| t.transfers.get(&id).cloned()).await)
    }

    async fn list_all(&mut self) -> Result<Vec<Transfer>, StorageError> {
        let mut transfers = self
            .read(|t| t.transfers.values().cloned().collect::<Vec<_>>())
            .await;
        transfers.sort_by(history_order);
        Ok(transfers)
    }

    async fn history_by_account(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<Transfer>, StorageError> {
        let mut transfers = self
            .read(|t| {
                t.transfers
                    .values()
                    .filter(|tr| tr.involves(account_id))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        transfers.sort_by(history_order);
        Ok(transfers)
    }

    async fn insert(&mut self, transfer: &Transfer) -> Result<(), StorageError> {
        self.changes.push(Change::InsertTransfer(transfer.clone()));
        Ok(())
    }

    async fn update(&mut self, transfer: &Transfer) -> Result<(), StorageError> {
        self.changes.push(Change::UpdateTransfer(transfer.clone()));
        Ok(())
    }

    async fn delete(&mut self, id: TransferId) -> Result<(), StorageError> {
        self.changes.push(Change::DeleteTransfer(id));
        Ok(())
    }

    async fn references_account(&mut self, account_id: AccountId) -> Result<bool, StorageError> {
        Ok(self
            .read(|t| t.transfers.values().any(|tr| tr.involves(account_id)))
            .await)
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn accounts(&mut self) -> &mut dyn AccountRepository {
        self
    }

    fn transfers(&mut self) -> &mut dyn TransferRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<usize, StorageError> {
        if self.changes.is_empty() {
            return Ok(0);
        }
        let mut tables = self.tables.write().await;
        let mut next = tables.clone();
        for change in &self.changes {
            next.apply(change)?;
        }
        *tables = next;
        debug!(changes = self.changes.len(), "Memory ledger commit");
        Ok(self.changes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::TransferRequest;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn account(number: &str) -> Account {
        Account::open("Holder".into(), number.into(), Decimal::from(100))
    }

    async fn committed(ledger: &MemoryLedger, account: &Account) {
        let mut uow = ledger.begin().await.unwrap();
        uow.accounts().insert(account).await.unwrap();
        assert_eq!(uow.commit().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_staged_reads_and_isolation() {
        let ledger = MemoryLedger::new();
        let acc = account("111111");

        let mut uow = ledger.begin().await.unwrap();
        uow.accounts().insert(&acc).await.unwrap();
        // visible inside the unit
        assert!(uow.accounts().get_by_id(acc.id).await.unwrap().is_some());

        // invisible outside until commit
        let mut other = ledger.begin().await.unwrap();
        assert!(other.accounts().get_by_id(acc.id).await.unwrap().is_none());

        uow.commit().await.unwrap();
        assert!(other.accounts().get_by_number("111111").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_drop_discards_changes() {
        let ledger = MemoryLedger::new();
        {
            let mut uow = ledger.begin().await.unwrap();
            uow.accounts().insert(&account("111111")).await.unwrap();
        }
        let mut uow = ledger.begin().await.unwrap();
        assert!(uow.accounts().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_bumps_version_and_detects_stale_copy() {
        let ledger = MemoryLedger::new();
        let acc = account("111111");
        committed(&ledger, &acc).await;

        let mut first = ledger.begin().await.unwrap();
        let mut second = ledger.begin().await.unwrap();
        let mut a = first.accounts().get_by_id(acc.id).await.unwrap().unwrap();
        let mut b = second.accounts().get_by_id(acc.id).await.unwrap().unwrap();

        a.credit(Decimal::from(5), Utc::now()).unwrap();
        first.accounts().save(&a).await.unwrap();
        first.commit().await.unwrap();

        b.credit(Decimal::from(7), Utc::now()).unwrap();
        second.accounts().save(&b).await.unwrap();
        let err = second.commit().await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let mut uow = ledger.begin().await.unwrap();
        let stored = uow.accounts().get_by_id(acc.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.balance(), Decimal::from(105));
    }

    #[tokio::test]
    async fn test_commit_is_all_or_nothing() {
        let ledger = MemoryLedger::new();
        committed(&ledger, &account("111111")).await;

        let req = TransferRequest::new(AccountId::new(), AccountId::new(), Decimal::ONE, Utc::now());
        let mut uow = ledger.begin().await.unwrap();
        uow.transfers()
            .insert(&Transfer::settled(&req, Utc::now()))
            .await
            .unwrap();
        // duplicate number fails the whole unit
        uow.accounts().insert(&account("111111")).await.unwrap();
        assert!(matches!(
            uow.commit().await,
            Err(StorageError::Conflict(_))
        ));

        let mut uow = ledger.begin().await.unwrap();
        assert!(uow.transfers().list_all().await.unwrap().is_empty());
        assert_eq!(uow.accounts().list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_rows() {
        let ledger = MemoryLedger::new();
        let mut uow = ledger.begin().await.unwrap();
        uow.accounts().save(&account("111111")).await.unwrap();
        assert!(matches!(uow.commit().await, Err(StorageError::Missing(_))));

        let mut uow = ledger.begin().await.unwrap();
        uow.transfers().delete(TransferId::new()).await.unwrap();
        assert!(matches!(uow.commit().await, Err(StorageError::Missing(_))));
    }

    #[tokio::test]
    async fn test_history_tiebreak_by_id_desc() {
        let ledger = MemoryLedger::new();
        let holder = AccountId::new();
        let date = Utc::now();
        let req = TransferRequest::new(holder, AccountId::new(), Decimal::ONE, date);

        let first = Transfer::settled(&req, Utc::now());
        let second = Transfer::settled(&req, Utc::now());
        let mut uow = ledger.begin().await.unwrap();
        uow.transfers().insert(&first).await.unwrap();
        uow.transfers().insert(&second).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = ledger.begin().await.unwrap();
        let history = uow.transfers().history_by_account(holder).await.unwrap();
        let expected = if second.id() > first.id() {
            vec![second.id(), first.id()]
        } else {
            vec![first.id(), second.id()]
        };
        assert_eq!(history.iter().map(|t| t.id()).collect::<Vec<_>>(), expected);
        assert!(uow.transfers().references_account(holder).await.unwrap());
        assert!(!uow.transfers().references_account(AccountId::new()).await.unwrap());
    }
}
