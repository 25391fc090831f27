//! Wire types shared by the HTTP server and its clients.
//!
//! All timestamps are RFC3339 in UTC. Money is integer minor units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod family {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FamilyNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FamilyRename {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FamilyView {
        pub id: Uuid,
        pub name: String,
        pub created_at: DateTime<Utc>,
        /// Active members; populated on single-family fetches only.
        #[serde(default)]
        pub members: Vec<super::member::MemberView>,
    }
}

pub mod member {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MemberRole {
        Admin,
        Member,
        Viewer,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub family_id: Uuid,
        pub name: String,
        /// Defaults to `member`.
        pub role: Option<MemberRole>,
        pub phone: Option<String>,
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberUpdate {
        pub name: Option<String>,
        pub phone: Option<String>,
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleChange {
        pub role: MemberRole,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: Uuid,
        pub family_id: Uuid,
        pub name: String,
        pub role: MemberRole,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub active: bool,
        pub created_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryKind {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub kind: CategoryKind,
        pub parent_id: Option<Uuid>,
        pub sort_order: Option<i32>,
    }

    /// Absent fields are left unchanged. Setting `detach_parent` moves
    /// the category to root level; it wins over `parent_id`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub kind: Option<CategoryKind>,
        pub parent_id: Option<Uuid>,
        #[serde(default)]
        pub detach_parent: bool,
        pub sort_order: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListQuery {
        pub kind: Option<CategoryKind>,
        pub parent_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTreeQuery {
        pub kind: CategoryKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub kind: CategoryKind,
        pub parent_id: Option<Uuid>,
        pub path: String,
        pub level: i32,
        pub sort_order: i32,
        pub created_at: DateTime<Utc>,
        #[serde(default)]
        pub children: Vec<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FullPathResponse {
        /// Ancestor names joined with `" > "`.
        pub full_path: String,
    }
}

pub mod tag {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagNew {
        pub family_id: Uuid,
        pub name: String,
        pub kind: String,
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagUpdate {
        pub name: Option<String>,
        pub kind: Option<String>,
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagListQuery {
        pub kind: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagView {
        pub id: Uuid,
        pub family_id: Uuid,
        pub name: String,
        pub kind: String,
        pub color: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub family_id: Uuid,
        pub member_id: Uuid,
        pub amount_minor: i64,
        pub kind: TransactionKind,
        pub category_id: Uuid,
        pub occurred_at: DateTime<Utc>,
        pub note: Option<String>,
        pub payment_method: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub member_id: Option<Uuid>,
        pub amount_minor: Option<i64>,
        pub kind: Option<TransactionKind>,
        pub category_id: Option<Uuid>,
        pub occurred_at: Option<DateTime<Utc>>,
        pub note: Option<String>,
        pub payment_method: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub member_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub payment_method: Option<String>,
        pub start: Option<DateTime<Utc>>,
        pub end: Option<DateTime<Utc>>,
        /// 1-based; defaults to 1.
        pub page: Option<u64>,
        /// Defaults to 20.
        pub per_page: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub family_id: Uuid,
        pub member_id: Uuid,
        pub amount_minor: i64,
        pub kind: TransactionKind,
        pub category_id: Uuid,
        pub occurred_at: DateTime<Utc>,
        pub note: Option<String>,
        pub payment_method: Option<String>,
        pub tags: Vec<super::tag::TagView>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub total: u64,
        pub page: u64,
        pub per_page: u64,
    }
}

pub mod stats {
    use super::*;
    use std::collections::HashMap;

    /// Query for category summaries. The window defaults to the last 30
    /// days; the kind defaults to `expense`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySummaryQuery {
        pub start: Option<DateTime<Utc>>,
        pub end: Option<DateTime<Utc>>,
        pub kind: Option<super::transaction::TransactionKind>,
    }

    /// Query for time-series summaries. `group_by` accepts `day`,
    /// `month` (default) or `year`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TimeSummaryQuery {
        pub start: Option<DateTime<Utc>>,
        pub end: Option<DateTime<Utc>>,
        pub group_by: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryResponse {
        /// Group label (category name or time bucket) to summed minor
        /// units. Groups without transactions are absent.
        pub totals: HashMap<String, i64>,
    }
}
