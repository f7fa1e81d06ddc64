//! Transfer Execution Engine
//!
//! Settles one transfer request against the ledger:
//!
//! ```text
//! check_request ──▶ ceiling ──▶ acquire permit ──▶ begin
//!                                                   │
//!        load source ─▶ load destination ─▶ sufficiency ─▶ debit/credit
//!                                                   │
//!              ok: save both + SUCCESS record ──▶ commit
//!        rejected: FAILURE(reason) record only ──▶ commit ──▶ Err
//! ```
//!
//! Structural and ceiling rejections return before the permit and leave no
//! record. Storage errors drop the unit of work, so nothing from the attempt
//! is persisted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::account::BalanceError;
use crate::money::DEFAULT_TRANSFER_CEILING;
use crate::store::{Ledger, UnitOfWork};

use super::error::TransferError;
use super::guard::{GlobalSettlementLock, SettlementLock};
use super::types::{Transfer, TransferRequest};
use super::validation::check_request;

/// Tracing target for settlement outcomes
pub const SETTLEMENT_TARGET: &str = "SETTLEMENT";

/// Per-transfer business limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferLimits {
    /// Largest amount a single transfer may move
    pub ceiling: Decimal,
}

impl Default for TransferLimits {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_TRANSFER_CEILING,
        }
    }
}

/// The single authority over balance mutation
pub struct TransferEngine {
    ledger: Arc<dyn Ledger>,
    lock: Arc<dyn SettlementLock>,
    limits: TransferLimits,
}

impl TransferEngine {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        lock: Arc<dyn SettlementLock>,
        limits: TransferLimits,
    ) -> Self {
        Self {
            ledger,
            lock,
            limits,
        }
    }

    /// Engine with the process-wide lock and default limits
    pub fn with_global_lock(ledger: Arc<dyn Ledger>) -> Self {
        Self::new(
            ledger,
            Arc::new(GlobalSettlementLock::new()),
            TransferLimits::default(),
        )
    }

    pub fn limits(&self) -> TransferLimits {
        self.limits
    }

    pub fn lock_name(&self) -> &'static str {
        self.lock.name()
    }

    /// Execute one transfer attempt
    ///
    /// # Errors
    /// * `Validation` - structural problems, no record written
    /// * `AmountTooLarge` - above the ceiling, no record written
    /// * `SourceAccountNotFound` / `DestinationAccountNotFound` /
    ///   `InsufficientBalance` / `Overflow` - a FAILURE record was committed
    /// * `Storage` - nothing from this attempt was persisted
    pub async fn execute(&self, req: TransferRequest) -> Result<Transfer, TransferError> {
        let now = Utc::now();

        check_request(&req)?;

        if req.amount > self.limits.ceiling {
            warn!(
                target: SETTLEMENT_TARGET,
                source = %req.source_account_id,
                destination = %req.destination_account_id,
                amount = %req.amount,
                ceiling = %self.limits.ceiling,
                "Transfer rejected above ceiling"
            );
            return Err(TransferError::AmountTooLarge {
                ceiling: self.limits.ceiling,
            });
        }

        let _permit = self
            .lock
            .acquire(req.source_account_id, req.destination_account_id)
            .await;
        debug!(
            target: SETTLEMENT_TARGET,
            lock = self.lock.name(),
            source = %req.source_account_id,
            destination = %req.destination_account_id,
            "Settlement section entered"
        );

        let mut uow = self.ledger.begin().await?;

        match settle(uow.as_mut(), &req, now).await {
            Ok(transfer) => {
                let changes = uow.commit().await.inspect_err(|e| {
                    error!(
                        target: SETTLEMENT_TARGET,
                        transfer_id = %transfer.id(),
                        error = %e,
                        "Settlement commit failed"
                    );
                })?;
                info!(
                    target: SETTLEMENT_TARGET,
                    transfer_id = %transfer.id(),
                    source = %req.source_account_id,
                    destination = %req.destination_account_id,
                    amount = %req.amount,
                    changes,
                    "Transfer settled"
                );
                Ok(transfer)
            }
            Err(rejection) if rejection.is_settlement_rejection() => {
                let record = Transfer::failed(&req, rejection.to_string(), now);
                uow.transfers().insert(&record).await?;
                uow.commit().await?;
                warn!(
                    target: SETTLEMENT_TARGET,
                    transfer_id = %record.id(),
                    source = %req.source_account_id,
                    destination = %req.destination_account_id,
                    amount = %req.amount,
                    reason = %rejection,
                    "Transfer rejected"
                );
                Err(rejection)
            }
            Err(e) => {
                error!(
                    target: SETTLEMENT_TARGET,
                    source = %req.source_account_id,
                    destination = %req.destination_account_id,
                    error = %e,
                    "Settlement aborted"
                );
                Err(e)
            }
        }
    }
}

/// Load, check and stage one settlement
///
/// Every rule is checked before anything is staged, so a rejection leaves the
/// unit of work clean for the FAILURE record.
async fn settle(
    uow: &mut dyn UnitOfWork,
    req: &TransferRequest,
    now: DateTime<Utc>,
) -> Result<Transfer, TransferError> {
    let mut source = uow
        .accounts()
        .get_by_id(req.source_account_id)
        .await?
        .ok_or(TransferError::SourceAccountNotFound)?;

    if req.is_self_transfer() {
        // balance no-op, but the holder must still be able to cover it
        source.debit(req.amount, now).map_err(balance_error)?;
        source.credit(req.amount, now).map_err(balance_error)?;
        uow.accounts().save(&source).await?;
    } else {
        let mut destination = uow
            .accounts()
            .get_by_id(req.destination_account_id)
            .await?
            .ok_or(TransferError::DestinationAccountNotFound)?;

        source.debit(req.amount, now).map_err(balance_error)?;
        destination.credit(req.amount, now).map_err(balance_error)?;

        uow.accounts().save(&source).await?;
        uow.accounts().save(&destination).await?;
    }

    let transfer = Transfer::settled(req, now);
    uow.transfers().insert(&transfer).await?;
    Ok(transfer)
}

fn balance_error(e: BalanceError) -> TransferError {
    match e {
        BalanceError::Insufficient => TransferError::InsufficientBalance,
        BalanceError::Overflow => TransferError::Overflow,
    }
}
