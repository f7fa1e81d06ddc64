//! Money Module
//!
//! Amounts and balances are `rust_decimal::Decimal` values in currency units.
//! All client-facing parsing and formatting goes through this module.
//!
//! ## Rules
//! 1. Currency precision is [`CURRENCY_SCALE`] decimal places
//! 2. No silent truncation: extra precision is rejected, never rounded
//! 3. Strict formats only: `.5` and `5.` are rejected
//!
//! ## Usage
//! ```rust
//! use transfer_ledger::money::{format_amount, parse_amount};
//!
//! let amount = parse_amount("1500.25").unwrap();
//! assert_eq!(format_amount(amount), "1500.25");
//! ```

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Decimal places carried by every amount and balance
pub const CURRENCY_SCALE: u32 = 2;

/// Default per-transfer ceiling in currency units
pub const DEFAULT_TRANSFER_CEILING: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Largest storable balance, the limit of a NUMERIC(28, 2) column
pub const MAX_BALANCE: Decimal =
    Decimal::from_parts(268_435_455, 1_042_612_833, 542_101_086, false, CURRENCY_SCALE);

// ============================================================================
// Error Types
// ============================================================================

/// Money conversion errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Amount would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Parse: Client → Internal
// ============================================================================

/// Parse a client amount string into a positive Decimal
///
/// # Errors
/// * `InvalidFormat` - empty string, `.5`, `5.`, several dots, stray characters
/// * `InvalidAmount` - zero or signed values
/// * `PrecisionOverflow` - more than [`CURRENCY_SCALE`] decimal places
pub fn parse_amount(amount_str: &str) -> Result<Decimal, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if amount_str.starts_with('-') || amount_str.starts_with('+') {
        return Err(MoneyError::InvalidAmount);
    }

    let parts: Vec<&str> = amount_str.split('.').collect();
    match parts.as_slice() {
        [whole] => check_digits(whole)?,
        [whole, frac] => {
            if whole.is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "missing leading zero (e.g., use 0.5 instead of .5)".into(),
                ));
            }
            if frac.is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
                ));
            }
            check_digits(whole)?;
            check_digits(frac)?;
        }
        _ => return Err(MoneyError::InvalidFormat("multiple decimal points".into())),
    }

    let value = Decimal::from_str(amount_str).map_err(|_| MoneyError::Overflow)?;
    validate_amount(value)
}

fn check_digits(part: &str) -> Result<(), MoneyError> {
    if part.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(MoneyError::InvalidFormat(format!(
            "invalid character in amount: {}",
            part
        )))
    }
}

/// Validate an already-parsed Decimal as a transfer amount
///
/// Trailing zeros beyond the currency scale (`1.500`) are accepted; only
/// significant extra digits are rejected.
pub fn validate_amount(value: Decimal) -> Result<Decimal, MoneyError> {
    if value.is_sign_negative() || value.is_zero() {
        return Err(MoneyError::InvalidAmount);
    }
    check_precision(value)
}

/// Validate a balance: zero allowed, negative rejected, precision enforced
///
/// # Errors
/// * `InvalidAmount` - below zero
/// * `Overflow` - above [`MAX_BALANCE`]
/// * `PrecisionOverflow` - more than [`CURRENCY_SCALE`] decimal places
pub fn validate_balance(value: Decimal) -> Result<Decimal, MoneyError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(MoneyError::InvalidAmount);
    }
    if value > MAX_BALANCE {
        return Err(MoneyError::Overflow);
    }
    check_precision(value)
}

fn check_precision(value: Decimal) -> Result<Decimal, MoneyError> {
    let normalized = value.normalize();
    if normalized.scale() > CURRENCY_SCALE {
        return Err(MoneyError::PrecisionOverflow {
            provided: normalized.scale(),
            max: CURRENCY_SCALE,
        });
    }
    Ok(normalized)
}

// ============================================================================
// Format: Internal → Client
// ============================================================================

/// Format an amount with exactly [`CURRENCY_SCALE`] decimal places
pub fn format_amount(value: Decimal) -> String {
    format!("{:.prec$}", value, prec = CURRENCY_SCALE as usize)
}
