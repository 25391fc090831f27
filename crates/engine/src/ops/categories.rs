use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    Category, CategoryKind, EngineError, NewCategory, ResultEngine, UpdateCategory, build_tree,
    categories::{self, parse_path},
    util::require_name,
    validate,
};

use super::{Engine, with_tx};

const CATEGORY_NAME_MAX: usize = 100;

/// Fetch the parent a category is being placed under, enforcing that it
/// exists, is active, and carries the expected kind.
async fn require_parent(
    db_tx: &DatabaseTransaction,
    parent_id: Uuid,
    kind: CategoryKind,
) -> ResultEngine<Category> {
    let model = categories::Entity::find_by_id(parent_id.to_string())
        .one(db_tx)
        .await?;
    let parent = match model {
        Some(model) if !model.is_deleted => Category::try_from(model)?,
        _ => return Err(EngineError::NotFound("parent category".to_string())),
    };
    if parent.kind != kind {
        return Err(EngineError::IntegrityMismatch(format!(
            "parent category is {}, child would be {}",
            parent.kind.as_str(),
            kind.as_str()
        )));
    }
    Ok(parent)
}

impl Engine {
    /// Create a category, as a root or under an active parent of the same
    /// kind. The materialized path and level are written complete in the
    /// single insert.
    pub async fn create_category(&self, cmd: NewCategory) -> ResultEngine<Category> {
        let name = require_name(&cmd.name, "category name", CATEGORY_NAME_MAX)?;

        with_tx!(self, |db_tx| {
            let parent = match cmd.parent_id {
                Some(parent_id) => Some(require_parent(&db_tx, parent_id, cmd.kind).await?),
                None => None,
            };
            if validate::category_name_taken(&db_tx, &name, cmd.kind, cmd.parent_id, None).await? {
                return Err(EngineError::Conflict(format!(
                    "category name {name:?} already in use among siblings"
                )));
            }

            let id = Uuid::new_v4();
            let (path, level) = match &parent {
                Some(parent) => (format!("{}/{id}", parent.path), parent.level + 1),
                None => (format!("/{id}"), 1),
            };
            let category = Category {
                id,
                name,
                kind: cmd.kind,
                parent_id: cmd.parent_id,
                path,
                level,
                sort_order: cmd.sort_order,
                deleted: false,
                created_at: Utc::now(),
                children: Vec::new(),
            };
            categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;
            Ok(category)
        })
    }

    /// Update a category. Reparenting recomputes the subtree's paths and
    /// levels in the same DB transaction; a move that would place a
    /// category under its own descendant is refused, leaving the category
    /// untouched.
    pub async fn update_category(&self, cmd: UpdateCategory) -> ResultEngine<Category> {
        let name = cmd
            .name
            .as_deref()
            .map(|n| require_name(n, "category name", CATEGORY_NAME_MAX))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = categories::Entity::find_by_id(cmd.category_id.to_string())
                .one(&db_tx)
                .await?;
            let current = match model {
                Some(model) if !model.is_deleted => Category::try_from(model)?,
                _ => return Err(EngineError::NotFound("category".to_string())),
            };

            let kind = cmd.kind.unwrap_or(current.kind);
            let parent_id = cmd.parent_id.unwrap_or(current.parent_id);
            let name = name.unwrap_or_else(|| current.name.clone());
            let sort_order = cmd.sort_order.unwrap_or(current.sort_order);

            if kind != current.kind {
                let active_children = categories::Entity::find()
                    .filter(categories::Column::ParentId.eq(current.id.to_string()))
                    .filter(categories::Column::IsDeleted.eq(false))
                    .count(&db_tx)
                    .await?;
                if active_children > 0 {
                    return Err(EngineError::IntegrityMismatch(
                        "cannot change kind while active children exist".to_string(),
                    ));
                }
            }

            let parent = match parent_id {
                Some(parent_id) => {
                    if parent_id == current.id {
                        return Err(EngineError::Conflict(
                            "category cannot be its own parent".to_string(),
                        ));
                    }
                    let parent = require_parent(&db_tx, parent_id, kind).await?;
                    // The parent's path lists its full ancestor chain; the
                    // move is a cycle exactly when we appear in it.
                    if parent.path_ids()?.contains(&current.id) {
                        return Err(EngineError::Conflict(
                            "category cannot be moved under its own descendant".to_string(),
                        ));
                    }
                    Some(parent)
                }
                None => None,
            };

            if validate::category_name_taken(&db_tx, &name, kind, parent_id, Some(current.id))
                .await?
            {
                return Err(EngineError::Conflict(format!(
                    "category name {name:?} already in use among siblings"
                )));
            }

            let (path, level) = match &parent {
                Some(parent) => (format!("{}/{}", parent.path, current.id), parent.level + 1),
                None => (format!("/{}", current.id), 1),
            };

            let active = categories::ActiveModel {
                id: ActiveValue::Set(current.id.to_string()),
                name: ActiveValue::Set(name),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                parent_id: ActiveValue::Set(parent_id.map(|id| id.to_string())),
                path: ActiveValue::Set(path.clone()),
                level: ActiveValue::Set(level),
                sort_order: ActiveValue::Set(sort_order),
                ..Default::default()
            };
            let updated = active.update(&db_tx).await?;

            if path != current.path {
                rewrite_subtree(&db_tx, &current.path, &path, level - current.level).await?;
            }

            Category::try_from(updated)
        })
    }

    /// Soft-delete a category. Refused while active children exist, so a
    /// subtree is removed leaves first.
    pub async fn delete_category(&self, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = categories::Entity::find_by_id(category_id.to_string())
                .one(&db_tx)
                .await?;
            let Some(model) = model.filter(|m| !m.is_deleted) else {
                return Err(EngineError::NotFound("category".to_string()));
            };

            let active_children = categories::Entity::find()
                .filter(categories::Column::ParentId.eq(category_id.to_string()))
                .filter(categories::Column::IsDeleted.eq(false))
                .count(&db_tx)
                .await?;
            if active_children > 0 {
                return Err(EngineError::Conflict(format!(
                    "category has {active_children} active child(ren)"
                )));
            }

            let active = categories::ActiveModel {
                id: ActiveValue::Set(model.id),
                is_deleted: ActiveValue::Set(true),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Fetch an active category by id.
    pub async fn category(&self, category_id: Uuid) -> ResultEngine<Category> {
        let model = categories::Entity::find_by_id(category_id.to_string())
            .one(&self.database)
            .await?;
        match model {
            Some(model) if !model.is_deleted => Category::try_from(model),
            _ => Err(EngineError::NotFound("category".to_string())),
        }
    }

    /// List the active categories of one kind, flat.
    pub async fn categories_by_kind(&self, kind: CategoryKind) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::IsDeleted.eq(false))
            .filter(categories::Column::Kind.eq(kind.as_str()))
            .order_by_asc(categories::Column::SortOrder)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Category::try_from).collect()
    }

    /// List the active children of a parent, or the active roots when
    /// `parent_id` is `None`.
    pub async fn categories_by_parent(
        &self,
        parent_id: Option<Uuid>,
    ) -> ResultEngine<Vec<Category>> {
        let mut query = categories::Entity::find().filter(categories::Column::IsDeleted.eq(false));
        match parent_id {
            Some(parent_id) => {
                // Reject listing under a missing or deleted parent.
                self.category(parent_id).await.map_err(|err| match err {
                    EngineError::NotFound(_) => EngineError::NotFound("parent category".to_string()),
                    other => other,
                })?;
                query = query.filter(categories::Column::ParentId.eq(parent_id.to_string()));
            }
            None => {
                query = query.filter(categories::Column::ParentId.is_null());
            }
        }
        let models = query
            .order_by_asc(categories::Column::SortOrder)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Category::try_from).collect()
    }

    /// List every active category, both kinds, flat.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::IsDeleted.eq(false))
            .order_by_asc(categories::Column::SortOrder)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Category::try_from).collect()
    }

    /// Assemble the active categories of one kind into a forest.
    pub async fn category_tree(&self, kind: CategoryKind) -> ResultEngine<Vec<Category>> {
        Ok(build_tree(self.categories_by_kind(kind).await?))
    }

    /// Human-readable ancestry of a category, names joined with `" > "`.
    /// Soft-deleted ancestors are skipped rather than shown.
    pub async fn full_category_path(&self, category_id: Uuid) -> ResultEngine<String> {
        let category = self.category(category_id).await?;
        let chain = parse_path(&category.path)?;

        let models = categories::Entity::find()
            .filter(
                categories::Column::Id.is_in(chain.iter().map(Uuid::to_string).collect::<Vec<_>>()),
            )
            .all(&self.database)
            .await?;
        let by_id: HashMap<String, categories::Model> =
            models.into_iter().map(|m| (m.id.clone(), m)).collect();

        let mut names = Vec::with_capacity(chain.len());
        for id in chain {
            if let Some(model) = by_id.get(&id.to_string())
                && !model.is_deleted
            {
                names.push(model.name.clone());
            }
        }
        Ok(names.join(" > "))
    }
}

/// Rebase every descendant of `old_path` onto `new_path`, shifting levels
/// by `level_delta`. Runs inside the caller's DB transaction.
async fn rewrite_subtree(
    db_tx: &DatabaseTransaction,
    old_path: &str,
    new_path: &str,
    level_delta: i32,
) -> ResultEngine<()> {
    let prefix = format!("{old_path}/");
    let descendants = categories::Entity::find()
        .filter(categories::Column::Path.starts_with(prefix.as_str()))
        .all(db_tx)
        .await?;

    for descendant in descendants {
        let suffix = descendant
            .path
            .strip_prefix(old_path)
            .unwrap_or(descendant.path.as_str());
        let active = categories::ActiveModel {
            id: ActiveValue::Set(descendant.id.clone()),
            path: ActiveValue::Set(format!("{new_path}{suffix}")),
            level: ActiveValue::Set(descendant.level + level_delta),
            ..Default::default()
        };
        active.update(db_tx).await?;
    }
    Ok(())
}
