use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, NewTag, ResultEngine, Tag, UpdateTag, tags, transaction_tags,
    util::require_name,
    validate,
};

use super::{Engine, with_tx};

const TAG_NAME_MAX: usize = 100;
const TAG_KIND_MAX: usize = 50;

/// `#RRGGBB`, lower or upper case.
fn checked_color(color: &str) -> ResultEngine<String> {
    let mut chars = color.chars();
    let well_formed = chars.next() == Some('#')
        && color.chars().count() == 7
        && chars.all(|c| c.is_ascii_hexdigit());
    if !well_formed {
        return Err(EngineError::Validation(format!(
            "color {color:?} is not #RRGGBB"
        )));
    }
    Ok(color.to_string())
}

impl Engine {
    /// Create a tag. Names are unique within the family,
    /// case-insensitively, among active tags.
    pub async fn create_tag(&self, cmd: NewTag) -> ResultEngine<Tag> {
        let name = require_name(&cmd.name, "tag name", TAG_NAME_MAX)?;
        let kind = require_name(&cmd.kind, "tag kind", TAG_KIND_MAX)?;
        let color = cmd.color.as_deref().map(checked_color).transpose()?;

        with_tx!(self, |db_tx| {
            if !validate::family_exists(&db_tx, cmd.family_id).await? {
                return Err(EngineError::NotFound("family".to_string()));
            }
            if validate::tag_name_taken(&db_tx, cmd.family_id, &name, None).await? {
                return Err(EngineError::Conflict(format!(
                    "tag name {name:?} already in use in this family"
                )));
            }

            let tag = Tag {
                id: Uuid::new_v4(),
                family_id: cmd.family_id,
                name,
                kind,
                color,
                active: true,
                created_at: Utc::now(),
            };
            tags::ActiveModel::from(&tag).insert(&db_tx).await?;
            Ok(tag)
        })
    }

    /// Fetch an active tag by id.
    pub async fn tag(&self, tag_id: Uuid) -> ResultEngine<Tag> {
        let model = tags::Entity::find_by_id(tag_id.to_string())
            .one(&self.database)
            .await?;
        match model {
            Some(model) if model.is_active => Tag::try_from(model),
            _ => Err(EngineError::NotFound("tag".to_string())),
        }
    }

    /// List the active tags of one family, oldest first.
    pub async fn family_tags(&self, family_id: Uuid) -> ResultEngine<Vec<Tag>> {
        let models = tags::Entity::find()
            .filter(tags::Column::FamilyId.eq(family_id.to_string()))
            .filter(tags::Column::IsActive.eq(true))
            .order_by_asc(tags::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Tag::try_from).collect()
    }

    /// List the active tags of one family carrying a given kind label.
    pub async fn tags_by_kind(&self, family_id: Uuid, kind: &str) -> ResultEngine<Vec<Tag>> {
        let models = tags::Entity::find()
            .filter(tags::Column::FamilyId.eq(family_id.to_string()))
            .filter(tags::Column::IsActive.eq(true))
            .filter(tags::Column::Kind.eq(kind))
            .order_by_asc(tags::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Tag::try_from).collect()
    }

    /// Update a tag. Absent fields keep their current value.
    pub async fn update_tag(&self, cmd: UpdateTag) -> ResultEngine<Tag> {
        let name = cmd
            .name
            .as_deref()
            .map(|n| require_name(n, "tag name", TAG_NAME_MAX))
            .transpose()?;
        let kind = cmd
            .kind
            .as_deref()
            .map(|k| require_name(k, "tag kind", TAG_KIND_MAX))
            .transpose()?;
        let color = cmd.color.as_deref().map(checked_color).transpose()?;

        with_tx!(self, |db_tx| {
            let model = tags::Entity::find_by_id(cmd.tag_id.to_string())
                .one(&db_tx)
                .await?;
            let Some(model) = model.filter(|m| m.is_active) else {
                return Err(EngineError::NotFound("tag".to_string()));
            };

            if let Some(name) = &name {
                let family_id = crate::util::parse_uuid(&model.family_id, "family")?;
                if validate::tag_name_taken(&db_tx, family_id, name, Some(cmd.tag_id)).await? {
                    return Err(EngineError::Conflict(format!(
                        "tag name {name:?} already in use in this family"
                    )));
                }
            }

            let mut active = tags::ActiveModel {
                id: ActiveValue::Set(model.id),
                ..Default::default()
            };
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(kind) = kind {
                active.kind = ActiveValue::Set(kind);
            }
            if let Some(color) = color {
                active.color = ActiveValue::Set(Some(color));
            }
            let updated = active.update(&db_tx).await?;
            Tag::try_from(updated)
        })
    }

    /// Soft-delete a tag. Refused while any transaction still carries it;
    /// detach the tag from those transactions first.
    pub async fn delete_tag(&self, tag_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = tags::Entity::find_by_id(tag_id.to_string())
                .one(&db_tx)
                .await?;
            let Some(model) = model.filter(|m| m.is_active) else {
                return Err(EngineError::NotFound("tag".to_string()));
            };

            let uses = transaction_tags::Entity::find()
                .filter(transaction_tags::Column::TagId.eq(tag_id.to_string()))
                .count(&db_tx)
                .await?;
            if uses > 0 {
                return Err(EngineError::Conflict(format!(
                    "tag is attached to {uses} transaction(s)"
                )));
            }

            let active = tags::ActiveModel {
                id: ActiveValue::Set(model.id),
                is_active: ActiveValue::Set(false),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }
}
