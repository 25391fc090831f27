use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Family, Member, ResultEngine, families, members, tags, transactions,
    util::require_name, validate,
};

use super::{Engine, with_tx};

const FAMILY_NAME_MAX: usize = 100;

impl Engine {
    /// Create a family. Names are unique across all families,
    /// case-insensitively.
    pub async fn create_family(&self, name: &str) -> ResultEngine<Family> {
        let name = require_name(name, "family name", FAMILY_NAME_MAX)?;

        with_tx!(self, |db_tx| {
            if validate::family_name_taken(&db_tx, &name, None).await? {
                return Err(EngineError::Conflict(format!(
                    "family name {name:?} already in use"
                )));
            }

            let family = Family {
                id: Uuid::new_v4(),
                name,
                created_at: Utc::now(),
                members: Vec::new(),
            };
            families::ActiveModel::from(&family).insert(&db_tx).await?;
            Ok(family)
        })
    }

    /// Fetch a family with its active members, oldest first.
    pub async fn family(&self, family_id: Uuid) -> ResultEngine<Family> {
        let model = families::Entity::find_by_id(family_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("family".to_string()))?;

        let member_models = members::Entity::find()
            .filter(members::Column::FamilyId.eq(family_id.to_string()))
            .filter(members::Column::Status.eq(members::STATUS_ACTIVE))
            .order_by_asc(members::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let mut family = Family::try_from(model)?;
        family.members = member_models
            .into_iter()
            .map(Member::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(family)
    }

    /// List all families, members not loaded.
    pub async fn list_families(&self) -> ResultEngine<Vec<Family>> {
        let models = families::Entity::find()
            .order_by_asc(families::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Family::try_from).collect()
    }

    /// Rename a family, keeping the global name uniqueness rule.
    pub async fn rename_family(&self, family_id: Uuid, name: &str) -> ResultEngine<Family> {
        let name = require_name(name, "family name", FAMILY_NAME_MAX)?;

        with_tx!(self, |db_tx| {
            let model = families::Entity::find_by_id(family_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("family".to_string()))?;

            if validate::family_name_taken(&db_tx, &name, Some(family_id)).await? {
                return Err(EngineError::Conflict(format!(
                    "family name {name:?} already in use"
                )));
            }

            let active = families::ActiveModel {
                id: ActiveValue::Set(model.id),
                name: ActiveValue::Set(name),
                ..Default::default()
            };
            let updated = active.update(&db_tx).await?;
            Family::try_from(updated)
        })
    }

    /// Delete a family permanently, together with its transactions, tags
    /// and removed member rows. Refused while any active member remains.
    pub async fn delete_family(&self, family_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = families::Entity::find_by_id(family_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("family".to_string()))?;

            let active_members = members::Entity::find()
                .filter(members::Column::FamilyId.eq(family_id.to_string()))
                .filter(members::Column::Status.eq(members::STATUS_ACTIVE))
                .count(&db_tx)
                .await?;
            if active_members > 0 {
                return Err(EngineError::Conflict(format!(
                    "family has {active_members} active member(s)"
                )));
            }

            // Dependents go first; tag links ride on the transaction
            // delete. Removed member rows stop existing with the family.
            transactions::Entity::delete_many()
                .filter(transactions::Column::FamilyId.eq(family_id.to_string()))
                .exec(&db_tx)
                .await?;
            tags::Entity::delete_many()
                .filter(tags::Column::FamilyId.eq(family_id.to_string()))
                .exec(&db_tx)
                .await?;
            members::Entity::delete_many()
                .filter(members::Column::FamilyId.eq(family_id.to_string()))
                .exec(&db_tx)
                .await?;
            model.delete(&db_tx).await?;
            Ok(())
        })
    }
}
