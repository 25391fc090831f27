//! Family API endpoints

use api_types::family::{FamilyNew, FamilyRename, FamilyView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<FamilyNew>,
) -> Result<(StatusCode, Json<FamilyView>), ServerError> {
    let family = state.engine.create_family(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(views::family_view(family))))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<FamilyView>>, ServerError> {
    let families = state.engine.list_families().await?;
    Ok(Json(families.into_iter().map(views::family_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(family_id): Path<Uuid>,
) -> Result<Json<FamilyView>, ServerError> {
    let family = state.engine.family(family_id).await?;
    Ok(Json(views::family_view(family)))
}

pub async fn rename(
    State(state): State<ServerState>,
    Path(family_id): Path<Uuid>,
    Json(payload): Json<FamilyRename>,
) -> Result<Json<FamilyView>, ServerError> {
    let family = state.engine.rename_family(family_id, &payload.name).await?;
    Ok(Json(views::family_view(family)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(family_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_family(family_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
