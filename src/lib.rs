//! Transfer Ledger - atomic money transfers between accounts
//!
//! # Modules
//!
//! - [`core_types`] - Account and transfer identifiers
//! - [`money`] - Amount parsing, scale rules and formatting
//! - [`validation`] - Field-level validation results
//! - [`account`] - Account model and management service
//! - [`transfer`] - Settlement engine, locks and transfer lifecycle
//! - [`store`] - Ledger storage contracts, in-memory and PostgreSQL ledgers
//! - [`db`] - PostgreSQL pool and schema
//! - [`gateway`] - HTTP API
//! - [`config`] / [`logging`] - Process configuration and tracing setup

// Core types - must be first!
pub mod core_types;

pub mod money;
pub mod validation;

pub mod account;
pub mod store;
pub mod transfer;

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use account::{Account, AccountError, AccountService};
pub use core_types::{AccountId, TransferId};
pub use store::{Ledger, MemoryLedger, PgLedger, StorageError};
pub use transfer::{
    Transfer, TransferEngine, TransferError, TransferRequest, TransferService, TransferStatus,
};
