//! Transaction API endpoints

use api_types::transaction::{
    TransactionListQuery, TransactionListResponse, TransactionNew, TransactionUpdate,
    TransactionView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::TransactionFilter;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

const DEFAULT_PER_PAGE: u64 = 20;

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = engine::NewTransaction::new(
        payload.family_id,
        payload.member_id,
        payload.amount_minor,
        views::engine_transaction_kind(payload.kind),
        payload.category_id,
        payload.occurred_at,
    );
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }
    if let Some(payment_method) = payload.payment_method {
        cmd = cmd.payment_method(payment_method);
    }

    let tx = state.engine.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(views::transaction_view(tx))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(transaction_id).await?;
    Ok(Json(views::transaction_view(tx)))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(family_id): Path<Uuid>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let mut filter = TransactionFilter::default();
    if let Some(member_id) = query.member_id {
        filter = filter.member(member_id);
    }
    if let Some(category_id) = query.category_id {
        filter = filter.category(category_id);
    }
    if let Some(payment_method) = query.payment_method {
        filter = filter.payment_method(payment_method);
    }
    if let Some(start) = query.start {
        filter = filter.occurred_after(start);
    }
    if let Some(end) = query.end {
        filter = filter.occurred_before(end);
    }

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);

    let (transactions, total) = state
        .engine
        .list_transactions(family_id, &filter, page, per_page)
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: transactions
            .into_iter()
            .map(views::transaction_view)
            .collect(),
        total,
        page,
        per_page,
    }))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let mut cmd = engine::UpdateTransaction::new(transaction_id);
    if let Some(member_id) = payload.member_id {
        cmd = cmd.member(member_id);
    }
    if let Some(amount_minor) = payload.amount_minor {
        cmd = cmd.amount_minor(amount_minor);
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(views::engine_transaction_kind(kind));
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category(category_id);
    }
    if let Some(occurred_at) = payload.occurred_at {
        cmd = cmd.occurred_at(occurred_at);
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }
    if let Some(payment_method) = payload.payment_method {
        cmd = cmd.payment_method(payment_method);
    }

    let tx = state.engine.update_transaction(cmd).await?;
    Ok(Json(views::transaction_view(tx)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(transaction_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn attach_tag(
    State(state): State<ServerState>,
    Path((transaction_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state.engine.tag_transaction(transaction_id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn detach_tag(
    State(state): State<ServerState>,
    Path((transaction_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .untag_transaction(transaction_id, tag_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
