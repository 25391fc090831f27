//! Tag API endpoints

use api_types::tag::{TagListQuery, TagNew, TagUpdate, TagView};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TagNew>,
) -> Result<(StatusCode, Json<TagView>), ServerError> {
    let mut cmd = engine::NewTag::new(payload.family_id, payload.name, payload.kind);
    if let Some(color) = payload.color {
        cmd = cmd.color(color);
    }

    let tag = state.engine.create_tag(cmd).await?;
    Ok((StatusCode::CREATED, Json(views::tag_view(tag))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(tag_id): Path<Uuid>,
) -> Result<Json<TagView>, ServerError> {
    let tag = state.engine.tag(tag_id).await?;
    Ok(Json(views::tag_view(tag)))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(family_id): Path<Uuid>,
    Query(query): Query<TagListQuery>,
) -> Result<Json<Vec<TagView>>, ServerError> {
    let tags = match query.kind.as_deref() {
        Some(kind) => state.engine.tags_by_kind(family_id, kind).await?,
        None => state.engine.family_tags(family_id).await?,
    };
    Ok(Json(tags.into_iter().map(views::tag_view).collect()))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(tag_id): Path<Uuid>,
    Json(payload): Json<TagUpdate>,
) -> Result<Json<TagView>, ServerError> {
    let mut cmd = engine::UpdateTag::new(tag_id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(kind);
    }
    if let Some(color) = payload.color {
        cmd = cmd.color(color);
    }

    let tag = state.engine.update_tag(cmd).await?;
    Ok(Json(views::tag_view(tag)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(tag_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_tag(tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
