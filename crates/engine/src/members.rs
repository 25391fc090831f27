//! Household members. A member belongs to exactly one family and is
//! soft-removed by flipping its status flag.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util};

/// Member status flag: 1 = active, 0 = removed.
pub(crate) const STATUS_ACTIVE: i16 = 1;
pub(crate) const STATUS_REMOVED: i16 = 0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    #[default]
    Member,
    Viewer,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Viewer => "viewer",
        }
    }
}

impl TryFrom<&str> for MemberRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            other => Err(EngineError::Validation(format!(
                "invalid member role: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub family_id: Uuid,
    pub name: String,
    pub role: MemberRole,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Whether the member is visible to listings and dependent checks.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub family_id: String,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: i16,
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
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::families::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Family.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Member> for ActiveModel {
    fn from(member: &Member) -> Self {
        Self {
            id: ActiveValue::Set(member.id.to_string()),
            family_id: ActiveValue::Set(member.family_id.to_string()),
            name: ActiveValue::Set(member.name.clone()),
            role: ActiveValue::Set(member.role.as_str().to_string()),
            phone: ActiveValue::Set(member.phone.clone()),
            email: ActiveValue::Set(member.email.clone()),
            status: ActiveValue::Set(if member.active {
                STATUS_ACTIVE
            } else {
                STATUS_REMOVED
            }),
            created_at: ActiveValue::Set(member.created_at),
        }
    }
}

impl TryFrom<Model> for Member {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "member")?,
            family_id: util::parse_uuid(&model.family_id, "family")?,
            name: model.name,
            role: MemberRole::try_from(model.role.as_str())?,
            phone: model.phone,
            email: model.email,
            active: model.status == STATUS_ACTIVE,
            created_at: model.created_at,
        })
    }
}
