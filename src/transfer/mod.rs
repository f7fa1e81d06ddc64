//! Transfer settlement
//!
//! # Architecture
//!
//! ```text
//! TransferEngine ──▶ SettlementLock ──▶ Ledger::begin ──▶ UnitOfWork::commit
//! TransferService ─────────────────────▶ Ledger::begin ──▶ UnitOfWork::commit
//! ```
//!
//! The engine is the only writer of balances. Every attempt that passes
//! structural validation and the ceiling leaves exactly one audit record,
//! committed in the same unit as any balance change.
//!
//! # Safety Invariants
//!
//! 1. **All-or-nothing**: balances and the SUCCESS record commit together
//! 2. **Audited rejection**: lookup and sufficiency failures commit a FAILURE record
//! 3. **Serialized section**: overlapping settlements never interleave
//! 4. **No reversal on cancel**: CANCELLED only relabels a settled record

pub mod engine;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod state;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use engine::{SETTLEMENT_TARGET, TransferEngine, TransferLimits};
pub use error::TransferError;
pub use guard::{
    AccountPairLock, GlobalSettlementLock, LockStrategy, SettlementLock, SettlementPermit,
};
pub use lifecycle::TransferService;
pub use state::TransferStatus;
pub use types::{Transfer, TransferRequest};
