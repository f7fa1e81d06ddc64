//! Structural checks run before any lock or lookup
//!
//! Failures here never produce an audit record.

use rust_decimal::Decimal;

use crate::money::{self, MoneyError};
use crate::validation::Violations;

use super::types::TransferRequest;

/// Collect every structural problem on the request
///
/// A transfer date earlier than the request's submission instant is in the
/// past.
pub fn check_request(req: &TransferRequest) -> Result<(), Violations> {
    let mut violations = Violations::new();

    if req.source_account_id.is_nil() {
        violations.push("source_account_id", "Source account is required");
    }
    if req.destination_account_id.is_nil() {
        violations.push("destination_account_id", "Destination account is required");
    }
    if let Some(message) = amount_problem(req.amount) {
        violations.push("amount", message);
    }
    if req.transfer_date < req.submitted_at {
        violations.push("transfer_date", "Transfer date cannot be in the past");
    }

    violations.into_result()
}

fn amount_problem(amount: Decimal) -> Option<String> {
    match money::validate_amount(amount) {
        Ok(_) => None,
        Err(MoneyError::InvalidAmount) => Some("Amount must be greater than zero".into()),
        Err(MoneyError::PrecisionOverflow { max, .. }) => {
            Some(format!("Amount supports at most {} decimal places", max))
        }
        Err(e) => Some(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::AccountId;
    use chrono::{DateTime, Duration, Utc};

    fn request(amount: Decimal, date: DateTime<Utc>, submitted: DateTime<Utc>) -> TransferRequest {
        TransferRequest::new(AccountId::new(), AccountId::new(), amount, date).submitted(submitted)
    }

    #[test]
    fn test_valid_request() {
        let now = Utc::now();
        assert!(check_request(&request(Decimal::from(500), now, now)).is_ok());
        assert!(check_request(&request(Decimal::new(1050, 2), now + Duration::days(3), now)).is_ok());
    }

    #[test]
    fn test_nil_ids_rejected() {
        let now = Utc::now();
        let req = TransferRequest::new(AccountId::nil(), AccountId::nil(), Decimal::ONE, now)
            .submitted(now);
        let v = check_request(&req).unwrap_err();
        assert!(v.has_field("source_account_id"));
        assert!(v.has_field("destination_account_id"));
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let now = Utc::now();
        for amount in [Decimal::ZERO, Decimal::from(-5)] {
            let v = check_request(&request(amount, now, now)).unwrap_err();
            assert!(v.to_string().contains("greater than zero"));
        }
    }

    #[test]
    fn test_sub_cent_amount_rejected() {
        let now = Utc::now();
        let v = check_request(&request(Decimal::new(1001, 3), now, now)).unwrap_err();
        assert!(v.has_field("amount"));
    }

    #[test]
    fn test_past_date_rejected() {
        let now = Utc::now();
        for behind in [Duration::minutes(1), Duration::seconds(1), Duration::milliseconds(1)] {
            let v = check_request(&request(Decimal::ONE, now - behind, now)).unwrap_err();
            assert!(v.has_field("transfer_date"));
        }
    }

    #[test]
    fn test_construction_stamps_submission() {
        let req = TransferRequest::new(
            AccountId::new(),
            AccountId::new(),
            Decimal::ONE,
            Utc::now() - Duration::seconds(1),
        );
        assert!(req.transfer_date < req.submitted_at);
        assert!(check_request(&req).unwrap_err().has_field("transfer_date"));
    }

    #[test]
    fn test_all_problems_reported_together() {
        let now = Utc::now();
        let req = TransferRequest::new(
            AccountId::nil(),
            AccountId::new(),
            Decimal::ZERO,
            now - Duration::days(1),
        )
        .submitted(now);
        assert_eq!(check_request(&req).unwrap_err().len(), 3);
    }
}
