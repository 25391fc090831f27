//! Referential checks shared by the operation modules.
//!
//! Every function here is a pure query: it answers an
//! existence/eligibility question against the current store state and
//! mutates nothing. Name-uniqueness checks scan the current listing and
//! compare case-insensitively; no cache is kept, so a check is only as
//! fresh as the store at call time.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    CategoryKind, ResultEngine, categories, families, members, tags,
    util::fold_name,
};

fn not_excluded(candidate_id: &str, exclude: Option<Uuid>) -> bool {
    match exclude {
        Some(id) => candidate_id != id.to_string(),
        None => true,
    }
}

/// True if the family exists. Families carry no soft-delete flag, so
/// existence is the whole check.
pub(crate) async fn family_exists<C: ConnectionTrait>(db: &C, id: Uuid) -> ResultEngine<bool> {
    Ok(families::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .is_some())
}

/// True only if the member exists, is active, and belongs to `family_id`.
pub(crate) async fn member_in_family<C: ConnectionTrait>(
    db: &C,
    member_id: Uuid,
    family_id: Uuid,
) -> ResultEngine<bool> {
    let Some(member) = members::Entity::find_by_id(member_id.to_string())
        .one(db)
        .await?
    else {
        return Ok(false);
    };
    Ok(member.status == members::STATUS_ACTIVE && member.family_id == family_id.to_string())
}

/// True only if the category exists, is not soft-deleted, and has the
/// expected kind.
pub(crate) async fn category_active_with_kind<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    kind: CategoryKind,
) -> ResultEngine<bool> {
    let Some(category) = categories::Entity::find_by_id(id.to_string()).one(db).await? else {
        return Ok(false);
    };
    Ok(!category.is_deleted && category.kind == kind.as_str())
}

/// Case-insensitive family-name check, global scope.
pub(crate) async fn family_name_taken<C: ConnectionTrait>(
    db: &C,
    name: &str,
    exclude: Option<Uuid>,
) -> ResultEngine<bool> {
    let folded = fold_name(name);
    let families = families::Entity::find().all(db).await?;
    Ok(families
        .iter()
        .any(|f| not_excluded(&f.id, exclude) && fold_name(&f.name) == folded))
}

/// Case-insensitive category-name check among active siblings sharing
/// the same parent and kind.
pub(crate) async fn category_name_taken<C: ConnectionTrait>(
    db: &C,
    name: &str,
    kind: CategoryKind,
    parent_id: Option<Uuid>,
    exclude: Option<Uuid>,
) -> ResultEngine<bool> {
    let folded = fold_name(name);
    let parent = parent_id.map(|id| id.to_string());
    let siblings = categories::Entity::find()
        .filter(categories::Column::IsDeleted.eq(false))
        .filter(categories::Column::Kind.eq(kind.as_str()))
        .all(db)
        .await?;
    Ok(siblings.iter().any(|c| {
        not_excluded(&c.id, exclude) && c.parent_id == parent && fold_name(&c.name) == folded
    }))
}

/// Case-insensitive tag-name check among active tags of one family.
pub(crate) async fn tag_name_taken<C: ConnectionTrait>(
    db: &C,
    family_id: Uuid,
    name: &str,
    exclude: Option<Uuid>,
) -> ResultEngine<bool> {
    let folded = fold_name(name);
    let tags = tags::Entity::find()
        .filter(tags::Column::FamilyId.eq(family_id.to_string()))
        .filter(tags::Column::IsActive.eq(true))
        .all(db)
        .await?;
    Ok(tags
        .iter()
        .any(|t| not_excluded(&t.id, exclude) && fold_name(&t.name) == folded))
}

/// Global email uniqueness across all members, exact comparison.
pub(crate) async fn member_email_taken<C: ConnectionTrait>(
    db: &C,
    email: &str,
    exclude: Option<Uuid>,
) -> ResultEngine<bool> {
    let members = members::Entity::find()
        .filter(members::Column::Email.eq(email))
        .all(db)
        .await?;
    Ok(members.iter().any(|m| not_excluded(&m.id, exclude)))
}

/// Global phone uniqueness across all members, exact comparison.
pub(crate) async fn member_phone_taken<C: ConnectionTrait>(
    db: &C,
    phone: &str,
    exclude: Option<Uuid>,
) -> ResultEngine<bool> {
    let members = members::Entity::find()
        .filter(members::Column::Phone.eq(phone))
        .all(db)
        .await?;
    Ok(members.iter().any(|m| not_excluded(&m.id, exclude)))
}
