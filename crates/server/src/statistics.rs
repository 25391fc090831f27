//! Statistics API endpoints
//!
//! Defaults: a 30-day window ending now, `expense` for the category
//! summary's kind, and `month` for the time summary's bucket width.

use api_types::stats::{CategorySummaryQuery, SummaryResponse, TimeSummaryQuery};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Duration, Utc};
use engine::Granularity;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

fn window(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = end.unwrap_or_else(Utc::now);
    let start = start.unwrap_or(end - Duration::days(30));
    (start, end)
}

pub async fn by_category(
    State(state): State<ServerState>,
    Path(family_id): Path<Uuid>,
    Query(query): Query<CategorySummaryQuery>,
) -> Result<Json<SummaryResponse>, ServerError> {
    let (start, end) = window(query.start, query.end);
    let kind = query
        .kind
        .map(views::engine_transaction_kind)
        .unwrap_or(engine::TransactionKind::Expense);

    let totals = state
        .engine
        .summary_by_category(family_id, start, end, kind)
        .await?;
    Ok(Json(views::summary_response(totals)))
}

pub async fn by_time(
    State(state): State<ServerState>,
    Path(family_id): Path<Uuid>,
    Query(query): Query<TimeSummaryQuery>,
) -> Result<Json<SummaryResponse>, ServerError> {
    let (start, end) = window(query.start, query.end);
    let granularity = match query.group_by.as_deref() {
        Some(group_by) => Granularity::try_from(group_by)?,
        None => Granularity::Month,
    };

    let totals = state
        .engine
        .summary_by_time(family_id, start, end, granularity)
        .await?;
    Ok(Json(views::summary_response(totals)))
}
