//! HTTP handlers

pub mod account;
pub mod health;
pub mod transfer;

pub use account::{
    __path_create_account, __path_delete_account, __path_get_account, __path_get_account_by_number,
    __path_list_accounts, __path_update_account, create_account, delete_account, get_account,
    get_account_by_number, list_accounts, update_account,
};
pub use health::{HealthResponse, __path_health_check, health_check};
pub use transfer::{
    __path_cancel_transfer, __path_create_transfer, __path_delete_transfer, __path_get_transfer,
    __path_list_transfers, __path_transfer_history, cancel_transfer, create_transfer,
    delete_transfer, get_transfer, list_transfers, transfer_history,
};

use crate::core_types::{AccountId, TransferId};

use super::types::ApiError;

/// Malformed path ids are rejected before reaching the services
pub(crate) fn parse_account_id(raw: &str) -> Result<AccountId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid account id: {}", raw)))
}

pub(crate) fn parse_transfer_id(raw: &str) -> Result<TransferId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid transfer id: {}", raw)))
}
