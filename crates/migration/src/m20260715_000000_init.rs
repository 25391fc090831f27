//! Initial schema migration - creates all tables from scratch.
//!
//! - `families`: top-level households owning everything else
//! - `members`: people inside a family, soft-removed via status
//! - `categories`: income/expense hierarchy with materialized paths
//! - `tags`: free-form labels scoped to a family
//! - `transactions`: income/expense records
//! - `transaction_tags`: tag attachments per transaction
//!
//! Name uniqueness (families, category siblings, tags) and member
//! email/phone uniqueness are enforced by engine checks, not indexes,
//! because the comparisons are case-insensitive over trimmed input.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Families {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Members {
    Table,
    Id,
    FamilyId,
    Name,
    Role,
    Phone,
    Email,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    Kind,
    ParentId,
    Path,
    Level,
    SortOrder,
    IsDeleted,
    CreatedAt,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    FamilyId,
    Name,
    Kind,
    Color,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    FamilyId,
    MemberId,
    AmountMinor,
    Kind,
    CategoryId,
    OccurredAt,
    Note,
    PaymentMethod,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TransactionTags {
    Table,
    Id,
    TransactionId,
    TagId,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Families
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Families::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Families::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Families::Name).string().not_null())
                    .col(ColumnDef::new(Families::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Members::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Members::FamilyId).string().not_null())
                    .col(ColumnDef::new(Members::Name).string().not_null())
                    .col(ColumnDef::new(Members::Role).string().not_null())
                    .col(ColumnDef::new(Members::Phone).string())
                    .col(ColumnDef::new(Members::Email).string())
                    .col(ColumnDef::new(Members::Status).small_integer().not_null())
                    .col(ColumnDef::new(Members::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-members-family_id")
                            .from(Members::Table, Members::FamilyId)
                            .to(Families::Table, Families::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-members-family_id")
                    .table(Members::Table)
                    .col(Members::FamilyId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Kind).string().not_null())
                    .col(ColumnDef::new(Categories::ParentId).string())
                    .col(ColumnDef::new(Categories::Path).string().not_null())
                    .col(ColumnDef::new(Categories::Level).integer().not_null())
                    .col(ColumnDef::new(Categories::SortOrder).integer().not_null())
                    .col(ColumnDef::new(Categories::IsDeleted).boolean().not_null())
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-parent_id")
                    .table(Categories::Table)
                    .col(Categories::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-kind")
                    .table(Categories::Table)
                    .col(Categories::Kind)
                    .to_owned(),
            )
            .await?;

        // Subtree rewrites filter on path prefixes.
        manager
            .create_index(
                Index::create()
                    .name("idx-categories-path")
                    .table(Categories::Table)
                    .col(Categories::Path)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Tags::FamilyId).string().not_null())
                    .col(ColumnDef::new(Tags::Name).string().not_null())
                    .col(ColumnDef::new(Tags::Kind).string().not_null())
                    .col(ColumnDef::new(Tags::Color).string())
                    .col(ColumnDef::new(Tags::IsActive).boolean().not_null())
                    .col(ColumnDef::new(Tags::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tags-family_id")
                            .from(Tags::Table, Tags::FamilyId)
                            .to(Families::Table, Families::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-tags-family_id")
                    .table(Tags::Table)
                    .col(Tags::FamilyId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::FamilyId).string().not_null())
                    .col(ColumnDef::new(Transactions::MemberId).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CategoryId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Note).string())
                    .col(ColumnDef::new(Transactions::PaymentMethod).string())
                    .col(ColumnDef::new(Transactions::Status).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-family_id")
                            .from(Transactions::Table, Transactions::FamilyId)
                            .to(Families::Table, Families::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-member_id")
                            .from(Transactions::Table, Transactions::MemberId)
                            .to(Members::Table, Members::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-category_id")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-family_id-occurred_at")
                    .table(Transactions::Table)
                    .col(Transactions::FamilyId)
                    .col(Transactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-member_id")
                    .table(Transactions::Table)
                    .col(Transactions::MemberId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-category_id")
                    .table(Transactions::Table)
                    .col(Transactions::CategoryId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Transaction tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TransactionTags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionTags::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TransactionTags::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionTags::TagId).string().not_null())
                    .col(
                        ColumnDef::new(TransactionTags::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_tags-transaction_id")
                            .from(TransactionTags::Table, TransactionTags::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_tags-tag_id")
                            .from(TransactionTags::Table, TransactionTags::TagId)
                            .to(Tags::Table, Tags::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_tags-transaction_id-tag_id-unique")
                    .table(TransactionTags::Table)
                    .col(TransactionTags::TransactionId)
                    .col(TransactionTags::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_tags-tag_id")
                    .table(TransactionTags::Table)
                    .col(TransactionTags::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransactionTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Families::Table).to_owned())
            .await?;
        Ok(())
    }
}
