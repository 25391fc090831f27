//! Member API endpoints

use api_types::member::{MemberNew, MemberUpdate, MemberView, RoleChange};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MemberNew>,
) -> Result<(StatusCode, Json<MemberView>), ServerError> {
    let mut cmd = engine::NewMember::new(payload.family_id, payload.name);
    if let Some(role) = payload.role {
        cmd = cmd.role(views::engine_member_role(role));
    }
    if let Some(phone) = payload.phone {
        cmd = cmd.phone(phone);
    }
    if let Some(email) = payload.email {
        cmd = cmd.email(email);
    }

    let member = state.engine.create_member(cmd).await?;
    Ok((StatusCode::CREATED, Json(views::member_view(member))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MemberView>, ServerError> {
    let member = state.engine.member(member_id).await?;
    Ok(Json(views::member_view(member)))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(family_id): Path<Uuid>,
) -> Result<Json<Vec<MemberView>>, ServerError> {
    let members = state.engine.family_members(family_id).await?;
    Ok(Json(members.into_iter().map(views::member_view).collect()))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<MemberUpdate>,
) -> Result<Json<MemberView>, ServerError> {
    let mut cmd = engine::UpdateMember::new(member_id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(phone) = payload.phone {
        cmd = cmd.phone(phone);
    }
    if let Some(email) = payload.email {
        cmd = cmd.email(email);
    }

    let member = state.engine.update_member(cmd).await?;
    Ok(Json(views::member_view(member)))
}

pub async fn change_role(
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<RoleChange>,
) -> Result<Json<MemberView>, ServerError> {
    let member = state
        .engine
        .change_member_role(member_id, views::engine_member_role(payload.role))
        .await?;
    Ok(Json(views::member_view(member)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_member(member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
