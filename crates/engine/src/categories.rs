//! Spending/income categories.
//!
//! Categories form a forest: each node carries an optional parent
//! reference plus a materialized `path` (the `/`-joined chain of ancestor
//! ids ending in its own id) and an integer `level` (roots are 1). The
//! path is written complete on insert because ids are generated by the
//! engine, not the store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for CategoryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::Validation(format!(
                "invalid category kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    pub parent_id: Option<Uuid>,
    pub path: String,
    pub level: i32,
    pub sort_order: i32,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    /// Populated only by tree assembly; flat queries leave it empty.
    pub children: Vec<Category>,
}

impl Category {
    /// Whether the category is visible to listings and dependent checks.
    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Ancestor chain encoded in `path`, own id last.
    pub fn path_ids(&self) -> ResultEngine<Vec<Uuid>> {
        parse_path(&self.path)
    }
}

/// Parse a materialized path (`/<id>/<id>/...`) into its ordered ids.
pub(crate) fn parse_path(path: &str) -> ResultEngine<Vec<Uuid>> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| util::parse_uuid(segment, "category path"))
        .collect()
}

/// Assemble a forest out of an unordered flat list.
///
/// Soft-deleted nodes are ignored. A node whose parent is not part of the
/// (active) input is dropped: it is neither a root nor attached anywhere,
/// matching the listing behavior when a parent was soft-deleted. The
/// resulting structure does not depend on input order; siblings are
/// sorted by `(sort_order, id)`.
pub fn build_tree(flat: Vec<Category>) -> Vec<Category> {
    let mut nodes: HashMap<Uuid, Category> = flat
        .into_iter()
        .filter(Category::is_active)
        .map(|mut node| {
            node.children.clear();
            (node.id, node)
        })
        .collect();

    let mut root_ids: Vec<Uuid> = Vec::new();
    let mut attach_ids: Vec<(i32, Uuid)> = Vec::new();
    for (id, node) in &nodes {
        match node.parent_id {
            None => root_ids.push(*id),
            Some(parent_id) if nodes.contains_key(&parent_id) => {
                attach_ids.push((node.level, *id));
            }
            Some(_) => {}
        }
    }

    // Deepest first, so every node has its own children before it is
    // moved into its parent.
    attach_ids.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, id) in attach_ids {
        let Some(node) = nodes.remove(&id) else {
            continue;
        };
        let Some(parent_id) = node.parent_id else {
            continue;
        };
        if let Some(parent) = nodes.get_mut(&parent_id) {
            parent.children.push(node);
        }
    }

    let mut roots: Vec<Category> = root_ids
        .into_iter()
        .filter_map(|id| nodes.remove(&id))
        .collect();
    sort_siblings(&mut roots);
    roots
}

fn sort_siblings(nodes: &mut Vec<Category>) {
    nodes.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
    for node in nodes {
        sort_siblings(&mut node.children);
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub kind: String,
    pub parent_id: Option<String>,
    pub path: String,
    pub level: i32,
    pub sort_order: i32,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(category: &Category) -> Self {
        Self {
            id: ActiveValue::Set(category.id.to_string()),
            name: ActiveValue::Set(category.name.clone()),
            kind: ActiveValue::Set(category.kind.as_str().to_string()),
            parent_id: ActiveValue::Set(category.parent_id.map(|id| id.to_string())),
            path: ActiveValue::Set(category.path.clone()),
            level: ActiveValue::Set(category.level),
            sort_order: ActiveValue::Set(category.sort_order),
            is_deleted: ActiveValue::Set(category.deleted),
            created_at: ActiveValue::Set(category.created_at),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "category")?,
            name: model.name,
            kind: CategoryKind::try_from(model.kind.as_str())?,
            parent_id: model
                .parent_id
                .as_deref()
                .map(|id| util::parse_uuid(id, "category parent"))
                .transpose()?,
            path: model.path,
            level: model.level,
            sort_order: model.sort_order,
            deleted: model.is_deleted,
            created_at: model.created_at,
            children: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: Uuid, parent: Option<Uuid>, level: i32, sort_order: i32) -> Category {
        Category {
            id,
            name: format!("node-{id}"),
            kind: CategoryKind::Expense,
            parent_id: parent,
            path: String::new(),
            level,
            sort_order,
            deleted: false,
            created_at: Utc::now(),
            children: Vec::new(),
        }
    }

    fn shape(forest: &[Category]) -> Vec<(Uuid, Vec<Uuid>)> {
        let mut out = Vec::new();
        for root in forest {
            out.push((root.id, root.children.iter().map(|c| c.id).collect()));
            out.extend(shape(&root.children));
        }
        out
    }

    #[test]
    fn build_tree_is_order_insensitive() {
        let (a, b, c, d) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let flat = vec![
            node(a, None, 1, 0),
            node(b, Some(a), 2, 0),
            node(c, Some(a), 2, 1),
            node(d, Some(b), 3, 0),
        ];
        let mut reversed = flat.clone();
        reversed.reverse();

        let forward = build_tree(flat);
        let backward = build_tree(reversed);
        assert_eq!(shape(&forward), shape(&backward));
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].children.len(), 2);
        assert_eq!(forward[0].children[0].children.len(), 1);
    }

    #[test]
    fn build_tree_drops_nodes_with_missing_parent() {
        let (a, orphan) = (Uuid::new_v4(), Uuid::new_v4());
        let missing = Uuid::new_v4();
        let forest = build_tree(vec![node(a, None, 1, 0), node(orphan, Some(missing), 2, 0)]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, a);
    }

    #[test]
    fn build_tree_skips_deleted_nodes_and_their_subtrees() {
        let (root, child, grandchild) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut deleted_child = node(child, Some(root), 2, 0);
        deleted_child.deleted = true;
        let forest = build_tree(vec![
            node(root, None, 1, 0),
            deleted_child,
            node(grandchild, Some(child), 3, 0),
        ]);
        assert_eq!(forest.len(), 1);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn parse_path_roundtrip() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let ids = parse_path(&format!("/{a}/{b}")).unwrap();
        assert_eq!(ids, vec![a, b]);
        assert!(parse_path("/not-a-uuid").is_err());
        assert_eq!(parse_path("").unwrap(), Vec::<Uuid>::new());
    }
}
