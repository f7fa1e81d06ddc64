//! Data models for holder accounts

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core_types::AccountId;
use crate::money::MAX_BALANCE;

/// Balance arithmetic failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceError {
    /// Debit larger than the available balance
    Insufficient,
    /// Credit would push the balance above [`MAX_BALANCE`]
    Overflow,
}

/// Holder account
///
/// `balance` is private: the settlement engine moves it through
/// [`Account::debit`] / [`Account::credit`], which keep it non-negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub account_number: String,
    balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version, bumped by the store on every save
    pub version: i32,
}

impl Account {
    /// Create a brand-new account (not yet persisted)
    pub fn open(name: String, account_number: String, balance: Decimal) -> Self {
        Self {
            id: AccountId::new(),
            name,
            account_number,
            balance,
            created_at: Utc::now(),
            updated_at: None,
            version: 0,
        }
    }

    /// Rebuild an account read back from storage
    pub fn restore(
        id: AccountId,
        name: String,
        account_number: String,
        balance: Decimal,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
        version: i32,
    ) -> Self {
        Self {
            id,
            name,
            account_number,
            balance,
            created_at,
            updated_at,
            version,
        }
    }

    #[inline]
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    #[inline]
    pub fn can_cover(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }

    /// Remove `amount` from the balance
    pub fn debit(&mut self, amount: Decimal, now: DateTime<Utc>) -> Result<(), BalanceError> {
        if !self.can_cover(amount) {
            return Err(BalanceError::Insufficient);
        }
        self.balance -= amount;
        self.updated_at = Some(now);
        Ok(())
    }

    /// Add `amount` to the balance
    pub fn credit(&mut self, amount: Decimal, now: DateTime<Utc>) -> Result<(), BalanceError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .filter(|b| *b <= MAX_BALANCE)
            .ok_or(BalanceError::Overflow)?;
        self.updated_at = Some(now);
        Ok(())
    }

    /// Administrative overwrite of the holder data
    ///
    /// The caller has already validated `balance` as non-negative.
    pub fn apply_update(
        &mut self,
        name: String,
        account_number: String,
        balance: Decimal,
        now: DateTime<Utc>,
    ) {
        self.name = name;
        self.account_number = account_number;
        self.balance = balance;
        self.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(balance: i64) -> Account {
        Account::open("Maria".into(), "000123".into(), Decimal::from(balance))
    }

    #[test]
    fn test_open_account() {
        let acc = account(100);
        assert!(!acc.id.is_nil());
        assert_eq!(acc.version, 0);
        assert!(acc.updated_at.is_none());
        assert_eq!(acc.balance(), Decimal::from(100));
    }

    #[test]
    fn test_debit_and_credit() {
        let now = Utc::now();
        let mut acc = account(1000);
        acc.debit(Decimal::from(400), now).unwrap();
        assert_eq!(acc.balance(), Decimal::from(600));
        acc.credit(Decimal::from(50), now).unwrap();
        assert_eq!(acc.balance(), Decimal::from(650));
        assert_eq!(acc.updated_at, Some(now));
    }

    #[test]
    fn test_debit_insufficient_leaves_balance() {
        let mut acc = account(500);
        let result = acc.debit(Decimal::from(1000), Utc::now());
        assert_eq!(result, Err(BalanceError::Insufficient));
        assert_eq!(acc.balance(), Decimal::from(500));
        assert!(acc.updated_at.is_none());
    }

    #[test]
    fn test_debit_exact_balance() {
        let mut acc = account(500);
        acc.debit(Decimal::from(500), Utc::now()).unwrap();
        assert_eq!(acc.balance(), Decimal::ZERO);
    }

    #[test]
    fn test_credit_overflow() {
        let mut acc = Account::open("Max".into(), "999999".into(), Decimal::MAX);
        assert_eq!(
            acc.credit(Decimal::ONE, Utc::now()),
            Err(BalanceError::Overflow)
        );
        assert_eq!(acc.balance(), Decimal::MAX);

        let mut acc = Account::open("Max".into(), "999999".into(), MAX_BALANCE);
        assert_eq!(
            acc.credit(Decimal::new(1, 2), Utc::now()),
            Err(BalanceError::Overflow)
        );
        assert_eq!(acc.balance(), MAX_BALANCE);
        assert!(acc.updated_at.is_none());
    }
}
