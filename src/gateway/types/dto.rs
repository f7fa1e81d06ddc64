//! Request and response bodies
//!
//! Amounts cross the boundary as strings with exactly two decimals on the way
//! out and strict-format strings on the way in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::account::Account;
use crate::core_types::AccountId;
use crate::money::{self, MoneyError};
use crate::transfer::{Transfer, TransferRequest};
use crate::validation::Violations;

/// Account response data
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountView {
    #[schema(value_type = String, format = Uuid)]
    pub id: AccountId,
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[schema(example = "12345678")]
    pub account_number: String,
    #[schema(example = "1000.00")]
    pub balance: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl From<Account> for AccountView {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            balance: money::format_amount(a.balance()),
            name: a.name,
            account_number: a.account_number,
            created_at: a.created_at,
            updated_at: a.updated_at,
            version: a.version,
        }
    }
}

/// Transfer response data
#[derive(Debug, Serialize, ToSchema)]
pub struct TransferView {
    /// ULID
    #[schema(example = "01HZX5K3QW8V6N2J4T7R9M0B1C")]
    pub id: String,
    #[schema(value_type = String, format = Uuid)]
    pub source_account_id: AccountId,
    #[schema(value_type = String, format = Uuid)]
    pub destination_account_id: AccountId,
    #[schema(example = "500.00")]
    pub amount: String,
    pub transfer_date: DateTime<Utc>,
    /// SUCCESS, FAILURE or CANCELLED
    #[schema(example = "SUCCESS")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Transfer> for TransferView {
    fn from(t: Transfer) -> Self {
        Self {
            id: t.id().to_string(),
            source_account_id: t.source_account_id(),
            destination_account_id: t.destination_account_id(),
            amount: money::format_amount(t.amount()),
            transfer_date: t.transfer_date(),
            status: t.status().as_str().to_string(),
            error_message: t.error_message().map(str::to_string),
            created_at: t.created_at(),
            updated_at: t.updated_at(),
        }
    }
}

/// Create-transfer request
///
/// Missing ids surface as "required" violations; a missing transfer date
/// means "now".
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransferRequest {
    #[schema(value_type = Option<String>, format = Uuid)]
    pub source_account_id: Option<AccountId>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub destination_account_id: Option<AccountId>,
    /// Strict decimal string, at most two decimals
    #[schema(example = "500.00")]
    pub amount: String,
    pub transfer_date: Option<DateTime<Utc>>,
}

impl CreateTransferRequest {
    /// Parse the wire body into an engine request submitted at `now`
    pub fn into_request(self, now: DateTime<Utc>) -> Result<TransferRequest, Violations> {
        let amount = money::parse_amount(&self.amount).map_err(|e| {
            let message = match e {
                MoneyError::InvalidAmount => "Amount must be greater than zero".to_string(),
                other => format!("Invalid amount: {}", other),
            };
            Violations::single("amount", message)
        })?;

        Ok(TransferRequest::new(
            self.source_account_id.unwrap_or_else(AccountId::nil),
            self.destination_account_id.unwrap_or_else(AccountId::nil),
            amount,
            self.transfer_date.unwrap_or(now),
        )
        .submitted(now))
    }
}

/// Cancel result
#[derive(Debug, Serialize, ToSchema)]
pub struct CancelResponse {
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_into_request_defaults() {
        let now = Utc::now();
        let body: CreateTransferRequest =
            serde_json::from_str(r#"{"amount": "12.50"}"#).unwrap();
        let req = body.into_request(now).unwrap();
        assert!(req.source_account_id.is_nil());
        assert!(req.destination_account_id.is_nil());
        assert_eq!(req.amount, Decimal::new(1250, 2));
        assert_eq!(req.transfer_date, now);
        assert_eq!(req.submitted_at, now);
    }

    #[test]
    fn test_into_request_keeps_receive_instant() {
        let now = Utc::now();
        let body = CreateTransferRequest {
            source_account_id: Some(AccountId::new()),
            destination_account_id: Some(AccountId::new()),
            amount: "10.00".into(),
            transfer_date: Some(now - chrono::Duration::seconds(1)),
        };
        let req = body.into_request(now).unwrap();
        assert_eq!(req.submitted_at, now);
        assert!(req.transfer_date < req.submitted_at);
    }

    #[test]
    fn test_into_request_rejects_bad_amounts() {
        for raw in ["0", "-5", ".5", "1.234", "abc"] {
            let body = CreateTransferRequest {
                source_account_id: Some(AccountId::new()),
                destination_account_id: Some(AccountId::new()),
                amount: raw.into(),
                transfer_date: None,
            };
            let v = body.into_request(Utc::now()).unwrap_err();
            assert!(v.has_field("amount"), "{} should be rejected", raw);
        }
    }

    #[test]
    fn test_views_format_amounts() {
        let account = Account::open("Maria".into(), "123456".into(), Decimal::from(5));
        let view = AccountView::from(account);
        assert_eq!(view.balance, "5.00");

        let req = TransferRequest::new(AccountId::new(), AccountId::new(), Decimal::new(5, 1), Utc::now());
        let view = TransferView::from(Transfer::failed(&req, "Insufficient balance", Utc::now()));
        assert_eq!(view.amount, "0.50");
        assert_eq!(view.status, "FAILURE");
        assert_eq!(view.error_message.as_deref(), Some("Insufficient balance"));
    }
}
