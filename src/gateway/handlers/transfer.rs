//! Transfer handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use chrono::Utc;

use super::super::state::AppState;
use super::super::types::{
    ApiError, ApiJson, ApiResult, CancelResponse, CreateTransferRequest, TransferView, created, ok,
};
use super::{parse_account_id, parse_transfer_id};

/// Execute a transfer
///
/// Rejections found while settling (missing account, insufficient balance)
/// are still recorded as FAILURE transfers before the error is returned.
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = CreateTransferRequest,
    responses(
        (status = 201, description = "Transfer settled", body = TransferView, content_type = "application/json"),
        (status = 400, description = "Validation failed"),
        (status = 422, description = "Ceiling exceeded, account not found or insufficient balance"),
        (status = 409, description = "Concurrent modification")
    ),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateTransferRequest>,
) -> ApiResult<TransferView> {
    let req = body
        .into_request(Utc::now())
        .map_err(|v| ApiError::validation(&v))?;
    let transfer = state.engine.execute(req).await?;
    created(transfer.into())
}

/// List transfers, newest transfer date first
#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    responses(
        (status = 200, description = "All transfers", body = Vec<TransferView>, content_type = "application/json")
    ),
    tag = "Transfer"
)]
pub async fn list_transfers(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TransferView>> {
    let transfers = state.transfers.list().await?;
    ok(transfers.into_iter().map(TransferView::from).collect())
}

/// Get transfer by id
#[utoipa::path(
    get,
    path = "/api/v1/transfers/{id}",
    params(("id" = String, Path, description = "Transfer id (ULID)")),
    responses(
        (status = 200, description = "Transfer", body = TransferView, content_type = "application/json"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Transfer not found")
    ),
    tag = "Transfer"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TransferView> {
    let id = parse_transfer_id(&id)?;
    ok(state.transfers.get(id).await?.into())
}

/// Cancel a settled transfer
///
/// Balances are not reversed.
#[utoipa::path(
    put,
    path = "/api/v1/transfers/{id}/cancel",
    params(("id" = String, Path, description = "Transfer id (ULID)")),
    responses(
        (status = 200, description = "Transfer cancelled", body = CancelResponse, content_type = "application/json"),
        (status = 404, description = "Transfer not found"),
        (status = 422, description = "Transfer is not cancellable")
    ),
    tag = "Transfer"
)]
pub async fn cancel_transfer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<CancelResponse> {
    let id = parse_transfer_id(&id)?;
    let cancelled = state.transfers.cancel(id).await?;
    ok(CancelResponse { cancelled })
}

/// Delete a transfer record
#[utoipa::path(
    delete,
    path = "/api/v1/transfers/{id}",
    params(("id" = String, Path, description = "Transfer id (ULID)")),
    responses(
        (status = 200, description = "Transfer deleted", content_type = "application/json"),
        (status = 404, description = "Transfer not found")
    ),
    tag = "Transfer"
)]
pub async fn delete_transfer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    let id = parse_transfer_id(&id)?;
    state.transfers.delete(id).await?;
    ok(id.to_string())
}

/// Transfer history of one account
#[utoipa::path(
    get,
    path = "/api/v1/transfers/history/{account_id}",
    params(("account_id" = String, Path, description = "Account id (UUID)")),
    responses(
        (status = 200, description = "Transfers naming the account, newest first", body = Vec<TransferView>, content_type = "application/json"),
        (status = 400, description = "Invalid account id"),
        (status = 404, description = "Account not found")
    ),
    tag = "Transfer"
)]
pub async fn transfer_history(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
) -> ApiResult<Vec<TransferView>> {
    let account_id = parse_account_id(&account_id)?;
    let history = state.transfers.history(account_id).await?;
    ok(history.into_iter().map(TransferView::from).collect())
}
