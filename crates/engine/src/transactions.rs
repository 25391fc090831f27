//! Transaction primitives.
//!
//! A `Transaction` records one income or expense event of a family
//! member against a category. Amounts are integer minor units; rendering
//! with two fraction digits is the transport's concern.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, tags, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// The category kind a transaction of this kind must reference.
    pub fn category_kind(self) -> crate::CategoryKind {
        match self {
            Self::Income => crate::CategoryKind::Income,
            Self::Expense => crate::CategoryKind::Expense,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// Lifecycle status. `Pending` is declared for storage compatibility but
/// no operation currently produces it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Valid,
    Deleted,
    Pending,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Deleted => "deleted",
            Self::Pending => "pending",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "valid" => Ok(Self::Valid),
            "deleted" => Ok(Self::Deleted),
            "pending" => Ok(Self::Pending),
            other => Err(EngineError::Validation(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub family_id: Uuid,
    pub member_id: Uuid,
    pub amount_minor: i64,
    pub kind: TransactionKind,
    pub category_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
    pub payment_method: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Attached tags. Empty unless the transaction was fetched with tags.
    pub tags: Vec<tags::Tag>,
}

impl Transaction {
    /// Whether the transaction is visible to listings and reports.
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Valid
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub family_id: String,
    pub member_id: String,
    pub amount_minor: i64,
    pub kind: String,
    pub category_id: String,
    pub occurred_at: DateTimeUtc,
    pub note: Option<String>,
    pub payment_method: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::families::Entity",
        from = "Column::FamilyId",
        to = "super::families::Column::Id"
    )]
    Family,
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Member,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::transaction_tags::Entity")]
    TransactionTags,
}

impl Related<super::families::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Family.def()
    }
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::transaction_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            family_id: ActiveValue::Set(tx.family_id.to_string()),
            member_id: ActiveValue::Set(tx.member_id.to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            category_id: ActiveValue::Set(tx.category_id.to_string()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            note: ActiveValue::Set(tx.note.clone()),
            payment_method: ActiveValue::Set(tx.payment_method.clone()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "transaction")?,
            family_id: util::parse_uuid(&model.family_id, "family")?,
            member_id: util::parse_uuid(&model.member_id, "member")?,
            amount_minor: model.amount_minor,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            category_id: util::parse_uuid(&model.category_id, "category")?,
            occurred_at: model.occurred_at,
            note: model.note,
            payment_method: model.payment_method,
            status: TransactionStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
            tags: Vec::new(),
        })
    }
}
