//! Conversions between engine values and wire views.

use api_types::{category, family, member, stats, tag, transaction};
use std::collections::HashMap;

pub(crate) fn member_role(role: engine::MemberRole) -> member::MemberRole {
    match role {
        engine::MemberRole::Admin => member::MemberRole::Admin,
        engine::MemberRole::Member => member::MemberRole::Member,
        engine::MemberRole::Viewer => member::MemberRole::Viewer,
    }
}

pub(crate) fn engine_member_role(role: member::MemberRole) -> engine::MemberRole {
    match role {
        member::MemberRole::Admin => engine::MemberRole::Admin,
        member::MemberRole::Member => engine::MemberRole::Member,
        member::MemberRole::Viewer => engine::MemberRole::Viewer,
    }
}

pub(crate) fn category_kind(kind: engine::CategoryKind) -> category::CategoryKind {
    match kind {
        engine::CategoryKind::Income => category::CategoryKind::Income,
        engine::CategoryKind::Expense => category::CategoryKind::Expense,
    }
}

pub(crate) fn engine_category_kind(kind: category::CategoryKind) -> engine::CategoryKind {
    match kind {
        category::CategoryKind::Income => engine::CategoryKind::Income,
        category::CategoryKind::Expense => engine::CategoryKind::Expense,
    }
}

pub(crate) fn transaction_kind(kind: engine::TransactionKind) -> transaction::TransactionKind {
    match kind {
        engine::TransactionKind::Income => transaction::TransactionKind::Income,
        engine::TransactionKind::Expense => transaction::TransactionKind::Expense,
    }
}

pub(crate) fn engine_transaction_kind(
    kind: transaction::TransactionKind,
) -> engine::TransactionKind {
    match kind {
        transaction::TransactionKind::Income => engine::TransactionKind::Income,
        transaction::TransactionKind::Expense => engine::TransactionKind::Expense,
    }
}

pub(crate) fn family_view(value: engine::Family) -> family::FamilyView {
    family::FamilyView {
        id: value.id,
        name: value.name,
        created_at: value.created_at,
        members: value.members.into_iter().map(member_view).collect(),
    }
}

pub(crate) fn member_view(value: engine::Member) -> member::MemberView {
    member::MemberView {
        id: value.id,
        family_id: value.family_id,
        name: value.name,
        role: member_role(value.role),
        phone: value.phone,
        email: value.email,
        active: value.active,
        created_at: value.created_at,
    }
}

pub(crate) fn category_view(value: engine::Category) -> category::CategoryView {
    category::CategoryView {
        id: value.id,
        name: value.name,
        kind: category_kind(value.kind),
        parent_id: value.parent_id,
        path: value.path,
        level: value.level,
        sort_order: value.sort_order,
        created_at: value.created_at,
        children: value.children.into_iter().map(category_view).collect(),
    }
}

pub(crate) fn tag_view(value: engine::Tag) -> tag::TagView {
    tag::TagView {
        id: value.id,
        family_id: value.family_id,
        name: value.name,
        kind: value.kind,
        color: value.color,
        created_at: value.created_at,
    }
}

pub(crate) fn transaction_view(value: engine::Transaction) -> transaction::TransactionView {
    transaction::TransactionView {
        id: value.id,
        family_id: value.family_id,
        member_id: value.member_id,
        amount_minor: value.amount_minor,
        kind: transaction_kind(value.kind),
        category_id: value.category_id,
        occurred_at: value.occurred_at,
        note: value.note,
        payment_method: value.payment_method,
        tags: value.tags.into_iter().map(tag_view).collect(),
        created_at: value.created_at,
        updated_at: value.updated_at,
    }
}

pub(crate) fn summary_response(totals: HashMap<String, i64>) -> stats::SummaryResponse {
    stats::SummaryResponse { totals }
}
