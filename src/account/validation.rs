//! Account request DTOs and their validation rules
//!
//! Rules:
//! - name: required, 2-100 characters
//! - account number: required, 6-10 characters
//! - balance: zero or positive, at most two decimal places

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::core_types::AccountId;
use crate::money;
use crate::validation::Violations;

/// Create-account request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewAccount {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(length(
        min = 6,
        max = 10,
        message = "Account number must be between 6 and 10 characters"
    ))]
    pub account_number: String,

    #[validate(custom(function = "non_negative_balance"))]
    #[schema(value_type = String, example = "1000.00")]
    pub balance: Decimal,
}

/// Update-account request
///
/// `id` must repeat the id in the resource path.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AccountUpdate {
    #[schema(value_type = String, format = Uuid)]
    pub id: AccountId,

    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(length(
        min = 6,
        max = 10,
        message = "Account number must be between 6 and 10 characters"
    ))]
    pub account_number: String,

    #[validate(custom(function = "non_negative_balance"))]
    #[schema(value_type = String, example = "1000.00")]
    pub balance: Decimal,
}

fn non_negative_balance(balance: &Decimal) -> Result<(), ValidationError> {
    money::validate_balance(*balance).map(|_| ()).map_err(|e| {
        let mut err = ValidationError::new("balance");
        err.message = Some(match e {
            money::MoneyError::InvalidAmount => "Balance cannot be negative".into(),
            money::MoneyError::Overflow => {
                "Balance exceeds the maximum supported value".into()
            }
            other => other.to_string().into(),
        });
        err
    })
}

/// Reject blank text first, then run the validator rules
pub fn check_new_account(req: &NewAccount) -> Result<(), Violations> {
    let mut violations = blank_checks(&req.name, &req.account_number);
    if violations.is_empty()
        && let Err(errors) = req.validate()
    {
        violations = errors.into();
    }
    violations.into_result()
}

/// Same rules as [`check_new_account`]
pub fn check_account_update(req: &AccountUpdate) -> Result<(), Violations> {
    let mut violations = blank_checks(&req.name, &req.account_number);
    if violations.is_empty()
        && let Err(errors) = req.validate()
    {
        violations = errors.into();
    }
    violations.into_result()
}

fn blank_checks(name: &str, account_number: &str) -> Violations {
    let mut violations = Violations::new();
    if name.trim().is_empty() {
        violations.push("name", "Name is required");
    }
    if account_number.trim().is_empty() {
        violations.push("account_number", "Account number is required");
    }
    violations
}
