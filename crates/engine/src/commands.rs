//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Optional fields default to
//! absent and are filled with the builder methods.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{CategoryKind, MemberRole, TransactionKind};

/// Add a member to a family.
#[derive(Clone, Debug)]
pub struct NewMember {
    pub family_id: Uuid,
    pub name: String,
    pub role: MemberRole,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl NewMember {
    #[must_use]
    pub fn new(family_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            family_id,
            name: name.into(),
            role: MemberRole::default(),
            phone: None,
            email: None,
        }
    }

    #[must_use]
    pub fn role(mut self, role: MemberRole) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Update a member's profile fields. Absent fields are left unchanged;
/// role changes go through a dedicated operation.
#[derive(Clone, Debug)]
pub struct UpdateMember {
    pub member_id: Uuid,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl UpdateMember {
    #[must_use]
    pub fn new(member_id: Uuid) -> Self {
        Self {
            member_id,
            name: None,
            phone: None,
            email: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Create a category, as a root or under a parent of the same kind.
#[derive(Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    pub kind: CategoryKind,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
}

impl NewCategory {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent_id: None,
            sort_order: 0,
        }
    }

    #[must_use]
    pub fn parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    #[must_use]
    pub fn sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// Update a category. Absent fields are left unchanged.
///
/// `parent_id` uses a two-level option: outer `None` keeps the current
/// parent, `Some(None)` moves the category to root level.
#[derive(Clone, Debug)]
pub struct UpdateCategory {
    pub category_id: Uuid,
    pub name: Option<String>,
    pub kind: Option<CategoryKind>,
    pub parent_id: Option<Option<Uuid>>,
    pub sort_order: Option<i32>,
}

impl UpdateCategory {
    #[must_use]
    pub fn new(category_id: Uuid) -> Self {
        Self {
            category_id,
            name: None,
            kind: None,
            parent_id: None,
            sort_order: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: CategoryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(Some(parent_id));
        self
    }

    #[must_use]
    pub fn to_root(mut self) -> Self {
        self.parent_id = Some(None);
        self
    }

    #[must_use]
    pub fn sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = Some(sort_order);
        self
    }
}

/// Create a tag in a family.
#[derive(Clone, Debug)]
pub struct NewTag {
    pub family_id: Uuid,
    pub name: String,
    pub kind: String,
    pub color: Option<String>,
}

impl NewTag {
    #[must_use]
    pub fn new(family_id: Uuid, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            family_id,
            name: name.into(),
            kind: kind.into(),
            color: None,
        }
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Update a tag. Absent fields are left unchanged.
#[derive(Clone, Debug)]
pub struct UpdateTag {
    pub tag_id: Uuid,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub color: Option<String>,
}

impl UpdateTag {
    #[must_use]
    pub fn new(tag_id: Uuid) -> Self {
        Self {
            tag_id,
            name: None,
            kind: None,
            color: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Record a transaction.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub family_id: Uuid,
    pub member_id: Uuid,
    pub amount_minor: i64,
    pub kind: TransactionKind,
    pub category_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
    pub payment_method: Option<String>,
}

impl NewTransaction {
    #[must_use]
    pub fn new(
        family_id: Uuid,
        member_id: Uuid,
        amount_minor: i64,
        kind: TransactionKind,
        category_id: Uuid,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            family_id,
            member_id,
            amount_minor,
            kind,
            category_id,
            occurred_at,
            note: None,
            payment_method: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }
}

/// Update an existing transaction. Absent fields are left unchanged; the
/// owning family is fixed at creation and cannot be retargeted.
#[derive(Clone, Debug)]
pub struct UpdateTransaction {
    pub transaction_id: Uuid,
    pub member_id: Option<Uuid>,
    pub amount_minor: Option<i64>,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<Uuid>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub payment_method: Option<String>,
}

impl UpdateTransaction {
    #[must_use]
    pub fn new(transaction_id: Uuid) -> Self {
        Self {
            transaction_id,
            member_id: None,
            amount_minor: None,
            kind: None,
            category_id: None,
            occurred_at: None,
            note: None,
            payment_method: None,
        }
    }

    #[must_use]
    pub fn member(mut self, member_id: Uuid) -> Self {
        self.member_id = Some(member_id);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }
}
