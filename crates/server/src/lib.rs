use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod categories;
mod families;
mod members;
mod server;
mod statistics;
mod tags;
mod transactions;
mod views;

pub mod types {
    pub mod family {
        pub use api_types::family::{FamilyNew, FamilyRename, FamilyView};
    }

    pub mod member {
        pub use api_types::member::{MemberNew, MemberRole, MemberUpdate, MemberView, RoleChange};
    }

    pub mod category {
        pub use api_types::category::{
            CategoryKind, CategoryListQuery, CategoryNew, CategoryTreeQuery, CategoryUpdate,
            CategoryView, FullPathResponse,
        };
    }

    pub mod tag {
        pub use api_types::tag::{TagListQuery, TagNew, TagUpdate, TagView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionKind, TransactionListQuery, TransactionListResponse, TransactionNew,
            TransactionUpdate, TransactionView,
        };
    }

    pub mod stats {
        pub use api_types::stats::{CategorySummaryQuery, SummaryResponse, TimeSummaryQuery};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation(_) | EngineError::IntegrityMismatch(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_integrity_mismatch_maps_to_422() {
        let res =
            ServerError::from(EngineError::IntegrityMismatch("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
