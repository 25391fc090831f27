//! Free-form tags, scoped to a family (merchant, occasion, area, ...).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub family_id: Uuid,
    pub name: String,
    /// Free-form grouping label, e.g. "merchant" or "occasion".
    pub kind: String,
    /// `#RRGGBB` when set.
    pub color: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Whether the tag is visible to listings and dependent checks.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub family_id: String,
    pub name: String,
    pub kind: String,
    pub color: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::families::Entity",
        from = "Column::FamilyId",
        to = "super::families::Column::Id"
    )]
    Family,
    #[sea_orm(has_many = "super::transaction_tags::Entity")]
    TransactionTags,
}

impl Related<super::families::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Family.def()
    }
}

impl Related<super::transaction_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Tag> for ActiveModel {
    fn from(tag: &Tag) -> Self {
        Self {
            id: ActiveValue::Set(tag.id.to_string()),
            family_id: ActiveValue::Set(tag.family_id.to_string()),
            name: ActiveValue::Set(tag.name.clone()),
            kind: ActiveValue::Set(tag.kind.clone()),
            color: ActiveValue::Set(tag.color.clone()),
            is_active: ActiveValue::Set(tag.active),
            created_at: ActiveValue::Set(tag.created_at),
        }
    }
}

impl TryFrom<Model> for Tag {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "tag")?,
            family_id: util::parse_uuid(&model.family_id, "family")?,
            name: model.name,
            kind: model.kind,
            color: model.color,
            active: model.is_active,
            created_at: model.created_at,
        })
    }
}
