//! Transfer Status Definitions
//!
//! Status IDs are stored as SMALLINT; the failure reason lives in its own
//! column and is only present for `Failure`.
//!
//! ```text
//! (attempt) ──commit ok──▶ SUCCESS ──cancel──▶ CANCELLED
//!     │
//!     └──rule rejected──▶ FAILURE(reason)
//! ```

use std::fmt;

/// Outcome of one transfer attempt
///
/// Terminal states: FAILURE, CANCELLED
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransferStatus {
    /// Balances moved and the record committed with them
    Success,

    /// A business rule rejected the attempt; balances untouched
    Failure { reason: String },

    /// Administratively cancelled after success. Balances are NOT reversed.
    Cancelled,
}

impl TransferStatus {
    pub const SUCCESS_ID: i16 = 10;
    pub const FAILURE_ID: i16 = -10;
    pub const CANCELLED_ID: i16 = -20;

    /// Whether an administrative cancel may move this record to CANCELLED
    #[inline]
    pub fn can_cancel(&self) -> bool {
        matches!(self, TransferStatus::Success)
    }

    /// Get the numeric status ID for storage
    #[inline]
    pub fn id(&self) -> i16 {
        match self {
            TransferStatus::Success => Self::SUCCESS_ID,
            TransferStatus::Failure { .. } => Self::FAILURE_ID,
            TransferStatus::Cancelled => Self::CANCELLED_ID,
        }
    }

    /// Rebuild from the stored status ID and error message column
    ///
    /// A FAILURE row must carry its message; `None` marks the row unreadable.
    pub fn from_parts(id: i16, error_message: Option<String>) -> Option<Self> {
        match id {
            Self::SUCCESS_ID => Some(TransferStatus::Success),
            Self::FAILURE_ID => error_message.map(|reason| TransferStatus::Failure { reason }),
            Self::CANCELLED_ID => Some(TransferStatus::Cancelled),
            _ => None,
        }
    }

    /// The error message column value
    pub fn error_message(&self) -> Option<&str> {
        match self {
            TransferStatus::Failure { reason } => Some(reason),
            _ => None,
        }
    }

    /// Get human-readable status name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Success => "SUCCESS",
            TransferStatus::Failure { .. } => "FAILURE",
            TransferStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> TransferStatus {
        TransferStatus::Failure {
            reason: "Insufficient balance".into(),
        }
    }

    #[test]
    fn test_only_success_can_cancel() {
        assert!(TransferStatus::Success.can_cancel());
        assert!(!failure().can_cancel());
        assert!(!TransferStatus::Cancelled.can_cancel());
    }

    #[test]
    fn test_storage_parts() {
        let status = failure();
        let rebuilt =
            TransferStatus::from_parts(status.id(), status.error_message().map(String::from));
        assert_eq!(rebuilt, Some(status));

        assert_eq!(
            TransferStatus::from_parts(TransferStatus::SUCCESS_ID, None),
            Some(TransferStatus::Success)
        );
        assert!(TransferStatus::from_parts(99, None).is_none());
    }

    #[test]
    fn test_failure_without_message_is_unreadable() {
        assert!(TransferStatus::from_parts(TransferStatus::FAILURE_ID, None).is_none());
        assert_eq!(
            TransferStatus::from_parts(TransferStatus::FAILURE_ID, Some(String::new())),
            Some(TransferStatus::Failure {
                reason: String::new()
            })
        );
    }

    #[test]
    fn test_error_message_only_on_failure() {
        assert_eq!(failure().error_message(), Some("Insufficient balance"));
        assert!(TransferStatus::Success.error_message().is_none());
        assert!(TransferStatus::Cancelled.error_message().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(TransferStatus::Success.to_string(), "SUCCESS");
        assert_eq!(failure().to_string(), "FAILURE");
        assert_eq!(TransferStatus::Cancelled.to_string(), "CANCELLED");
    }
}
