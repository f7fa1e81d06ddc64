//! Account handlers

use std::sync::Arc;

use axum::extract::{Path, State};

use crate::account::{AccountUpdate, NewAccount};
use crate::core_types::AccountId;

use super::super::state::AppState;
use super::super::types::{AccountView, ApiJson, ApiResult, created, ok};
use super::parse_account_id;

/// List accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "All accounts", body = Vec<AccountView>, content_type = "application/json")
    ),
    tag = "Account"
)]
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> ApiResult<Vec<AccountView>> {
    let accounts = state.accounts.list().await?;
    ok(accounts.into_iter().map(AccountView::from).collect())
}

/// Get account by id
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(("id" = String, Path, description = "Account id (UUID)")),
    responses(
        (status = 200, description = "Account", body = AccountView, content_type = "application/json"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Account not found")
    ),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<AccountView> {
    let id = parse_account_id(&id)?;
    ok(state.accounts.get(id).await?.into())
}

/// Get account by account number
#[utoipa::path(
    get,
    path = "/api/v1/accounts/by-number/{number}",
    params(("number" = String, Path, description = "Account number")),
    responses(
        (status = 200, description = "Account", body = AccountView, content_type = "application/json"),
        (status = 404, description = "Account not found")
    ),
    tag = "Account"
)]
pub async fn get_account_by_number(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> ApiResult<AccountView> {
    ok(state.accounts.get_by_number(&number).await?.into())
}

/// Create account
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = NewAccount,
    responses(
        (status = 201, description = "Account created", body = AccountView, content_type = "application/json"),
        (status = 400, description = "Validation failed"),
        (status = 422, description = "Account number already in use")
    ),
    tag = "Account"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<NewAccount>,
) -> ApiResult<AccountView> {
    created(state.accounts.create(req).await?.into())
}

/// Update account
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}",
    params(("id" = String, Path, description = "Account id (UUID)")),
    request_body = AccountUpdate,
    responses(
        (status = 200, description = "Account updated", body = AccountView, content_type = "application/json"),
        (status = 400, description = "Validation failed or id mismatch"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Concurrent modification")
    ),
    tag = "Account"
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AccountUpdate>,
) -> ApiResult<AccountView> {
    let id = parse_account_id(&id)?;
    ok(state.accounts.update(id, req).await?.into())
}

/// Delete account
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}",
    params(("id" = String, Path, description = "Account id (UUID)")),
    responses(
        (status = 200, description = "Account deleted", content_type = "application/json"),
        (status = 404, description = "Account not found"),
        (status = 422, description = "Account is referenced by transfers")
    ),
    tag = "Account"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<AccountId> {
    let id = parse_account_id(&id)?;
    state.accounts.delete(id).await?;
    ok(id)
}
