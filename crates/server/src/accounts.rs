//! Accounts API endpoints.

use api_types::account::{
    AccountBalanceView, AccountList, AccountNew, AccountUpdate, AccountView, AccountsResponse,
};
use api_types::{AccountKind as ApiAccountKind, MessageResponse, RemoveQuery};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use ledger::{Account, AccountChanges, AccountFilter, AccountKind, NewAccount};

use crate::{Body, ServerError, archived_filter, server::ServerState};

pub(crate) fn map_account(account: Account) -> AccountView {
    let is_active = account.is_active();
    AccountView {
        id: account.id,
        name: account.name,
        kind: map_kind(account.kind),
        description: account.description,
        initial_balance: account.initial_balance,
        current_balance: account.current_balance,
        color: account.color,
        icon: account.icon,
        is_active,
        archived_at: account.archived_at,
        created_at: account.created_at,
        updated_at: account.updated_at,
    }
}

fn map_kind(kind: AccountKind) -> ApiAccountKind {
    match kind {
        AccountKind::Checking => ApiAccountKind::Checking,
        AccountKind::Savings => ApiAccountKind::Savings,
        AccountKind::Investment => ApiAccountKind::Investment,
        AccountKind::CreditCard => ApiAccountKind::CreditCard,
        AccountKind::Cash => ApiAccountKind::Cash,
        AccountKind::Other => ApiAccountKind::Other,
    }
}

fn kind_to_ledger(kind: ApiAccountKind) -> AccountKind {
    match kind {
        ApiAccountKind::Checking => AccountKind::Checking,
        ApiAccountKind::Savings => AccountKind::Savings,
        ApiAccountKind::Investment => AccountKind::Investment,
        ApiAccountKind::CreditCard => AccountKind::CreditCard,
        ApiAccountKind::Cash => AccountKind::Cash,
        ApiAccountKind::Other => AccountKind::Other,
    }
}

fn filter_from(query: AccountList) -> AccountFilter {
    AccountFilter {
        kind: query.kind.map(kind_to_ledger),
        search: query.search,
        archived: archived_filter(query.is_active, query.only_active),
        page: query.page,
        per_page: query.per_page,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Body(payload): Body<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .ledger
        .new_account(NewAccount {
            name: payload.name,
            kind: kind_to_ledger(payload.kind),
            description: payload.description,
            initial_balance: payload.initial_balance,
            color: payload.color,
            icon: payload.icon,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(map_account(account))))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AccountList>,
) -> Result<Json<AccountsResponse>, ServerError> {
    let page = state.ledger.accounts(filter_from(query)).await?;

    Ok(Json(AccountsResponse {
        accounts: page.accounts.into_iter().map(map_account).collect(),
        total: page.total,
        total_balance: page.total_balance,
    }))
}

pub async fn list_active(
    State(state): State<ServerState>,
    Query(query): Query<AccountList>,
) -> Result<Json<AccountsResponse>, ServerError> {
    let mut filter = filter_from(query);
    filter.archived = Some(false);
    let page = state.ledger.accounts(filter).await?;

    Ok(Json(AccountsResponse {
        accounts: page.accounts.into_iter().map(map_account).collect(),
        total: page.total,
        total_balance: page.total_balance,
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.ledger.account(id).await?;
    Ok(Json(map_account(account)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Body(payload): Body<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .ledger
        .update_account(
            id,
            AccountChanges {
                name: payload.name,
                kind: payload.kind.map(kind_to_ledger),
                description: payload.description,
                color: payload.color,
                icon: payload.icon,
            },
        )
        .await?;

    Ok(Json(map_account(account)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<MessageResponse>, ServerError> {
    let permanent = query.permanent.unwrap_or(false);
    state.ledger.remove_account(id, permanent).await?;

    let message = if permanent {
        format!("account {id} deleted")
    } else {
        format!("account {id} archived")
    };
    Ok(Json(MessageResponse {
        message,
        success: true,
    }))
}

pub async fn restore(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.ledger.restore_account(id).await?;
    Ok(Json(map_account(account)))
}

pub async fn balance(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<AccountBalanceView>, ServerError> {
    let balance = state.ledger.account_balance(id).await?;

    Ok(Json(AccountBalanceView {
        account_id: balance.account_id,
        account_name: balance.account_name,
        current_balance: balance.current_balance,
    }))
}
