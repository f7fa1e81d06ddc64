//! Account management module
//!
//! Holder records and the CRUD surface over them. Balances only change
//! through the settlement engine or an explicit administrative update.

pub mod error;
pub mod models;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use error::AccountError;
pub use models::{Account, BalanceError};
pub use service::AccountService;
pub use validation::{AccountUpdate, NewAccount};
