//! Transactions API endpoints.

use api_types::transaction::{
    SummaryGet, SummaryView, TransactionList, TransactionNew, TransactionStatusUpdate,
    TransactionUpdate, TransactionView, TransactionsResponse,
};
use api_types::{MessageResponse, TransactionStatus as ApiStatus};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use ledger::{
    NewTransaction, SummaryFilter, TransactionChanges, TransactionDetail, TransactionFilter,
    TransactionStatus,
};

use crate::accounts::map_account;
use crate::categories::{flow_kind_to_ledger, map_category, map_flow_kind};
use crate::{Body, ServerError, server::ServerState};

fn map_status(status: TransactionStatus) -> ApiStatus {
    match status {
        TransactionStatus::Pending => ApiStatus::Pending,
        TransactionStatus::Completed => ApiStatus::Completed,
    }
}

fn status_to_ledger(status: ApiStatus) -> TransactionStatus {
    match status {
        ApiStatus::Pending => TransactionStatus::Pending,
        ApiStatus::Completed => TransactionStatus::Completed,
    }
}

fn map_transaction(detail: TransactionDetail) -> TransactionView {
    let transaction = detail.transaction;
    TransactionView {
        id: transaction.id,
        description: transaction.description,
        amount: transaction.amount,
        kind: map_flow_kind(transaction.kind),
        status: map_status(transaction.status),
        transaction_date: transaction.transaction_date,
        notes: transaction.notes,
        account_id: transaction.account_id,
        category_id: transaction.category_id,
        account: map_account(detail.account),
        category: map_category(detail.category),
        created_at: transaction.created_at,
        updated_at: transaction.updated_at,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Body(payload): Body<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let detail = state
        .ledger
        .new_transaction(NewTransaction {
            description: payload.description,
            amount: payload.amount,
            kind: flow_kind_to_ledger(payload.kind),
            status: status_to_ledger(payload.status),
            transaction_date: payload.transaction_date,
            notes: payload.notes,
            account_id: payload.account_id,
            category_id: payload.category_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(map_transaction(detail))))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<Json<TransactionsResponse>, ServerError> {
    let page = state
        .ledger
        .transactions(TransactionFilter {
            account_id: query.account_id,
            category_id: query.category_id,
            kind: query.kind.map(flow_kind_to_ledger),
            status: query.status.map(status_to_ledger),
            date_from: query.date_from,
            date_to: query.date_to,
            search: query.search,
            min_amount: query.min_amount,
            max_amount: query.max_amount,
            page: query.page,
            per_page: query.per_page,
        })
        .await?;

    Ok(Json(TransactionsResponse {
        transactions: page.transactions.into_iter().map(map_transaction).collect(),
        total: page.total,
        total_income: page.total_income,
        total_expense: page.total_expense,
        balance: page.balance,
    }))
}

pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<SummaryGet>,
) -> Result<Json<SummaryView>, ServerError> {
    let summary = state
        .ledger
        .transaction_summary(SummaryFilter {
            date_from: query.start_date,
            date_to: query.end_date,
            include_pending: !query.only_completed.unwrap_or(true),
        })
        .await?;

    Ok(Json(SummaryView {
        total_income: summary.total_income,
        total_expense: summary.total_expense,
        balance: summary.balance,
        total_transactions: summary.total_transactions,
        period_start: summary.period_start,
        period_end: summary.period_end,
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<TransactionView>, ServerError> {
    let detail = state.ledger.transaction(id).await?;
    Ok(Json(map_transaction(detail)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Body(payload): Body<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let detail = state
        .ledger
        .update_transaction(
            id,
            TransactionChanges {
                description: payload.description,
                amount: payload.amount,
                kind: payload.kind.map(flow_kind_to_ledger),
                status: payload.status.map(status_to_ledger),
                transaction_date: payload.transaction_date,
                notes: payload.notes,
                account_id: payload.account_id,
                category_id: payload.category_id,
            },
        )
        .await?;

    Ok(Json(map_transaction(detail)))
}

pub async fn set_status(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Body(payload): Body<TransactionStatusUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let detail = state
        .ledger
        .set_transaction_status(id, status_to_ledger(payload.status))
        .await?;

    Ok(Json(map_transaction(detail)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.ledger.remove_transaction(id).await?;

    Ok(Json(MessageResponse {
        message: format!("transaction {id} deleted"),
        success: true,
    }))
}
