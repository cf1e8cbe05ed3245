//! Categories API endpoints.

use api_types::category::{
    CategoriesResponse, CategoryList, CategoryNew, CategoryUpdate, CategoryView,
};
use api_types::{FlowKind as ApiFlowKind, MessageResponse, RemoveQuery};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use ledger::{Category, CategoryChanges, CategoryFilter, FlowKind, NewCategory};

use crate::{Body, ServerError, archived_filter, server::ServerState};

pub(crate) fn map_category(category: Category) -> CategoryView {
    let is_active = category.is_active();
    CategoryView {
        id: category.id,
        name: category.name,
        kind: map_flow_kind(category.kind),
        description: category.description,
        color: category.color,
        icon: category.icon,
        is_active,
        archived_at: category.archived_at,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

pub(crate) fn map_flow_kind(kind: FlowKind) -> ApiFlowKind {
    match kind {
        FlowKind::Income => ApiFlowKind::Income,
        FlowKind::Expense => ApiFlowKind::Expense,
    }
}

pub(crate) fn flow_kind_to_ledger(kind: ApiFlowKind) -> FlowKind {
    match kind {
        ApiFlowKind::Income => FlowKind::Income,
        ApiFlowKind::Expense => FlowKind::Expense,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Body(payload): Body<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .ledger
        .new_category(NewCategory {
            name: payload.name,
            kind: flow_kind_to_ledger(payload.kind),
            description: payload.description,
            color: payload.color,
            icon: payload.icon,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CategoryList>,
) -> Result<Json<CategoriesResponse>, ServerError> {
    let page = state
        .ledger
        .categories(CategoryFilter {
            kind: query.kind.map(flow_kind_to_ledger),
            search: query.search,
            archived: archived_filter(query.is_active, query.only_active),
            page: query.page,
            per_page: query.per_page,
        })
        .await?;

    Ok(Json(CategoriesResponse {
        categories: page.categories.into_iter().map(map_category).collect(),
        total: page.total,
    }))
}

pub async fn list_by_kind(
    State(state): State<ServerState>,
    Path(kind): Path<String>,
    Query(query): Query<CategoryList>,
) -> Result<Json<CategoriesResponse>, ServerError> {
    let kind = FlowKind::try_from(kind.as_str())?;
    let page = state
        .ledger
        .categories_by_kind(kind, query.page, query.per_page)
        .await?;

    Ok(Json(CategoriesResponse {
        categories: page.categories.into_iter().map(map_category).collect(),
        total: page.total,
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.ledger.category(id).await?;
    Ok(Json(map_category(category)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Body(payload): Body<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .ledger
        .update_category(
            id,
            CategoryChanges {
                name: payload.name,
                kind: payload.kind.map(flow_kind_to_ledger),
                description: payload.description,
                color: payload.color,
                icon: payload.icon,
            },
        )
        .await?;

    Ok(Json(map_category(category)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<MessageResponse>, ServerError> {
    let permanent = query.permanent.unwrap_or(false);
    state.ledger.remove_category(id, permanent).await?;

    let message = if permanent {
        format!("category {id} deleted")
    } else {
        format!("category {id} archived")
    };
    Ok(Json(MessageResponse {
        message,
        success: true,
    }))
}

pub async fn restore(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.ledger.restore_category(id).await?;
    Ok(Json(map_category(category)))
}
