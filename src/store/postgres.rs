//! PostgreSQL ledger
//!
//! One unit of work is one database transaction. Writes execute inside the
//! transaction as they are staged; `commit` commits it and dropping the unit
//! rolls it back.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Transaction};

use crate::account::Account;
use crate::core_types::{AccountId, TransferId};
use crate::db::{Database, SafeRow};
use crate::transfer::{Transfer, TransferStatus};

use super::{AccountRepository, Ledger, StorageError, TransferRepository, UnitOfWork};

const ACCOUNT_COLUMNS: &str =
    "account_id, name, account_number, balance, created_at, updated_at, version";

const TRANSFER_COLUMNS: &str = "transfer_id, source_account_id, destination_account_id, amount, \
     transfer_date, status, error_message, created_at, updated_at";

pub struct PgLedger {
    db: Database,
}

impl PgLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Ledger for PgLedger {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StorageError> {
        let tx = self.db.pool().begin().await?;
        Ok(Box::new(PgUnitOfWork { tx, changes: 0 }))
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
    changes: usize,
}

fn column<'r, T>(row: &'r PgRow, table: &str, name: &str) -> Result<T, StorageError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get_log(name)
        .ok_or_else(|| StorageError::Corrupted(format!("{}.{}", table, name)))
}

fn account_from_row(row: &PgRow) -> Result<Account, StorageError> {
    const TABLE: &str = "accounts_tb";
    Ok(Account::restore(
        AccountId::from_uuid(column(row, TABLE, "account_id")?),
        column(row, TABLE, "name")?,
        column(row, TABLE, "account_number")?,
        column::<Decimal>(row, TABLE, "balance")?,
        column::<DateTime<Utc>>(row, TABLE, "created_at")?,
        column::<Option<DateTime<Utc>>>(row, TABLE, "updated_at")?,
        column(row, TABLE, "version")?,
    ))
}

fn transfer_from_row(row: &PgRow) -> Result<Transfer, StorageError> {
    const TABLE: &str = "transfers_tb";
    let raw_id: String = column(row, TABLE, "transfer_id")?;
    let id = TransferId::from_str(raw_id.trim())
        .map_err(|e| StorageError::Corrupted(format!("{}.transfer_id {}: {}", TABLE, raw_id, e)))?;
    let status_id: i16 = column(row, TABLE, "status")?;
    let error_message: Option<String> = column(row, TABLE, "error_message")?;
    let status = TransferStatus::from_parts(status_id, error_message).ok_or_else(|| {
        StorageError::Corrupted(format!("{}.status {} for transfer {}", TABLE, status_id, id))
    })?;

    Ok(Transfer::restore(
        id,
        AccountId::from_uuid(column(row, TABLE, "source_account_id")?),
        AccountId::from_uuid(column(row, TABLE, "destination_account_id")?),
        column::<Decimal>(row, TABLE, "amount")?,
        column::<DateTime<Utc>>(row, TABLE, "transfer_date")?,
        status,
        column::<DateTime<Utc>>(row, TABLE, "created_at")?,
        column::<Option<DateTime<Utc>>>(row, TABLE, "updated_at")?,
    ))
}

impl PgUnitOfWork {
    async fn account_exists(&mut self, id: AccountId) -> Result<bool, StorageError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts_tb WHERE account_id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl AccountRepository for PgUnitOfWork {
    async fn get_by_id(&mut self, id: AccountId) -> Result<Option<Account>, StorageError> {
        let sql = format!("SELECT {} FROM accounts_tb WHERE account_id = $1", ACCOUNT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn get_by_number(&mut self, number: &str) -> Result<Option<Account>, StorageError> {
        let sql = format!(
            "SELECT {} FROM accounts_tb WHERE account_number = $1",
            ACCOUNT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(number)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn list_all(&mut self) -> Result<Vec<Account>, StorageError> {
        let sql = format!(
            "SELECT {} FROM accounts_tb ORDER BY created_at, account_id",
            ACCOUNT_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&mut *self.tx).await?;
        rows.iter().map(account_from_row).collect()
    }

    async fn insert(&mut self, account: &Account) -> Result<(), StorageError> {
        sqlx::query(
            r#"INSERT INTO accounts_tb
               (account_id, name, account_number, balance, created_at, updated_at, version)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.name)
        .bind(&account.account_number)
        .bind(account.balance())
        .bind(account.created_at)
        .bind(account.updated_at)
        .bind(account.version)
        .execute(&mut *self.tx)
        .await?;
        self.changes += 1;
        Ok(())
    }

    async fn save(&mut self, account: &Account) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"UPDATE accounts_tb
               SET name = $2, account_number = $3, balance = $4, updated_at = $5,
                   version = version + 1
               WHERE account_id = $1 AND version = $6"#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.name)
        .bind(&account.account_number)
        .bind(account.balance())
        .bind(account.updated_at)
        .bind(account.version)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(if self.account_exists(account.id).await? {
                StorageError::Conflict(format!(
                    "account {} changed concurrently (version {})",
                    account.id, account.version
                ))
            } else {
                StorageError::Missing(format!("account {}", account.id))
            });
        }
        self.changes += 1;
        Ok(())
    }

    async fn delete(&mut self, id: AccountId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM accounts_tb WHERE account_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::Missing(format!("account {}", id)));
        }
        self.changes += 1;
        Ok(())
    }
}

#[async_trait]
impl TransferRepository for PgUnitOfWork {
    async fn get_by_id(&mut self, id: TransferId) -> Result<Option<Transfer>, StorageError> {
        let sql = format!(
            "SELECT {} FROM transfers_tb WHERE transfer_id = $1",
            TRANSFER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(transfer_from_row).transpose()
    }

    async fn list_all(&mut self) -> Result<Vec<Transfer>, StorageError> {
        let sql = format!(
            "SELECT {} FROM transfers_tb ORDER BY transfer_date DESC, transfer_id DESC",
            TRANSFER_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&mut *self.tx).await?;
        rows.iter().map(transfer_from_row).collect()
    }

    async fn history_by_account(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<Transfer>, StorageError> {
        let sql = format!(
            r#"SELECT {} FROM transfers_tb
               WHERE source_account_id = $1 OR destination_account_id = $1
               ORDER BY transfer_date DESC, transfer_id DESC"#,
            TRANSFER_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(account_id.as_uuid())
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter().map(transfer_from_row).collect()
    }

    async fn insert(&mut self, transfer: &Transfer) -> Result<(), StorageError> {
        sqlx::query(
            r#"INSERT INTO transfers_tb
               (transfer_id, source_account_id, destination_account_id, amount,
                transfer_date, status, error_message, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(transfer.id().to_string())
        .bind(transfer.source_account_id().as_uuid())
        .bind(transfer.destination_account_id().as_uuid())
        .bind(transfer.amount())
        .bind(transfer.transfer_date())
        .bind(transfer.status().id())
        .bind(transfer.error_message())
        .bind(transfer.created_at())
        .bind(transfer.updated_at())
        .execute(&mut *self.tx)
        .await?;
        self.changes += 1;
        Ok(())
    }

    async fn update(&mut self, transfer: &Transfer) -> Result<(), StorageError> {
        // the settlement tuple is immutable; only status columns move
        let result = sqlx::query(
            r#"UPDATE transfers_tb
               SET status = $2, error_message = $3, updated_at = $4
               WHERE transfer_id = $1"#,
        )
        .bind(transfer.id().to_string())
        .bind(transfer.status().id())
        .bind(transfer.error_message())
        .bind(transfer.updated_at())
        .execute(&mut *self.tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::Missing(format!("transfer {}", transfer.id())));
        }
        self.changes += 1;
        Ok(())
    }

    async fn delete(&mut self, id: TransferId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM transfers_tb WHERE transfer_id = $1")
            .bind(id.to_string())
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::Missing(format!("transfer {}", id)));
        }
        self.changes += 1;
        Ok(())
    }

    async fn references_account(&mut self, account_id: AccountId) -> Result<bool, StorageError> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM transfers_tb
               WHERE source_account_id = $1 OR destination_account_id = $1)"#,
        )
        .bind(account_id.as_uuid())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn accounts(&mut self) -> &mut dyn AccountRepository {
        self
    }

    fn transfers(&mut self) -> &mut dyn TransferRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<usize, StorageError> {
        let PgUnitOfWork { tx, changes } = *self;
        tx.commit().await?;
        tracing::debug!(changes, "PostgreSQL ledger commit");
        Ok(changes)
    }
}
