//! Category API endpoints

use api_types::category::{
    CategoryListQuery, CategoryNew, CategoryTreeQuery, CategoryUpdate, CategoryView,
    FullPathResponse,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let mut cmd =
        engine::NewCategory::new(payload.name, views::engine_category_kind(payload.kind));
    if let Some(parent_id) = payload.parent_id {
        cmd = cmd.parent(parent_id);
    }
    if let Some(sort_order) = payload.sort_order {
        cmd = cmd.sort_order(sort_order);
    }

    let category = state.engine.create_category(cmd).await?;
    Ok((StatusCode::CREATED, Json(views::category_view(category))))
}

/// Flat listing: by parent when `parent_id` is given, else by kind when
/// `kind` is given, else everything.
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = if let Some(parent_id) = query.parent_id {
        state.engine.categories_by_parent(Some(parent_id)).await?
    } else if let Some(kind) = query.kind {
        state
            .engine
            .categories_by_kind(views::engine_category_kind(kind))
            .await?
    } else {
        state.engine.list_categories().await?
    };
    Ok(Json(
        categories.into_iter().map(views::category_view).collect(),
    ))
}

pub async fn roots(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.categories_by_parent(None).await?;
    Ok(Json(
        categories.into_iter().map(views::category_view).collect(),
    ))
}

pub async fn tree(
    State(state): State<ServerState>,
    Query(query): Query<CategoryTreeQuery>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let forest = state
        .engine
        .category_tree(views::engine_category_kind(query.kind))
        .await?;
    Ok(Json(forest.into_iter().map(views::category_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(category_id).await?;
    Ok(Json(views::category_view(category)))
}

pub async fn full_path(
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<FullPathResponse>, ServerError> {
    let full_path = state.engine.full_category_path(category_id).await?;
    Ok(Json(FullPathResponse { full_path }))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let mut cmd = engine::UpdateCategory::new(category_id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(views::engine_category_kind(kind));
    }
    if payload.detach_parent {
        cmd = cmd.to_root();
    } else if let Some(parent_id) = payload.parent_id {
        cmd = cmd.parent(parent_id);
    }
    if let Some(sort_order) = payload.sort_order {
        cmd = cmd.sort_order(sort_order);
    }

    let category = state.engine.update_category(cmd).await?;
    Ok(Json(views::category_view(category)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
