use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, Select, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, NewTransaction, ResultEngine, Tag, Transaction, TransactionStatus,
    UpdateTransaction, tags, transaction_tags, transactions,
    util::optional_text,
    validate,
};

use super::{Engine, with_tx};

const NOTE_MAX: usize = 1000;
const PAYMENT_METHOD_MAX: usize = 50;

/// Optional narrowing criteria for transaction listings. All fields
/// combine with AND; the defaults match everything.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub member_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub payment_method: Option<String>,
    pub occurred_after: Option<DateTime<Utc>>,
    pub occurred_before: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    #[must_use]
    pub fn member(mut self, member_id: Uuid) -> Self {
        self.member_id = Some(member_id);
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }

    #[must_use]
    pub fn occurred_after(mut self, after: DateTime<Utc>) -> Self {
        self.occurred_after = Some(after);
        self
    }

    #[must_use]
    pub fn occurred_before(mut self, before: DateTime<Utc>) -> Self {
        self.occurred_before = Some(before);
        self
    }

    fn apply(&self, mut query: Select<transactions::Entity>) -> Select<transactions::Entity> {
        if let Some(member_id) = self.member_id {
            query = query.filter(transactions::Column::MemberId.eq(member_id.to_string()));
        }
        if let Some(category_id) = self.category_id {
            query = query.filter(transactions::Column::CategoryId.eq(category_id.to_string()));
        }
        if let Some(payment_method) = &self.payment_method {
            query = query.filter(transactions::Column::PaymentMethod.eq(payment_method.as_str()));
        }
        if let Some(after) = self.occurred_after {
            query = query.filter(transactions::Column::OccurredAt.gte(after));
        }
        if let Some(before) = self.occurred_before {
            query = query.filter(transactions::Column::OccurredAt.lte(before));
        }
        query
    }
}

fn checked_amount(amount_minor: i64) -> ResultEngine<i64> {
    if amount_minor <= 0 {
        return Err(EngineError::Validation(
            "amount_minor must be > 0".to_string(),
        ));
    }
    Ok(amount_minor)
}

fn checked_occurred_at(occurred_at: DateTime<Utc>) -> ResultEngine<DateTime<Utc>> {
    if occurred_at > Utc::now() {
        return Err(EngineError::Validation(
            "occurred_at must not be in the future".to_string(),
        ));
    }
    Ok(occurred_at)
}

impl Engine {
    /// Record a transaction. The member must be an active member of the
    /// family and the category an active one of the matching kind.
    pub async fn create_transaction(&self, cmd: NewTransaction) -> ResultEngine<Transaction> {
        let amount_minor = checked_amount(cmd.amount_minor)?;
        let occurred_at = checked_occurred_at(cmd.occurred_at)?;
        let note = optional_text(cmd.note.as_deref(), "note", NOTE_MAX)?;
        let payment_method =
            optional_text(cmd.payment_method.as_deref(), "payment method", PAYMENT_METHOD_MAX)?;

        with_tx!(self, |db_tx| {
            if !validate::family_exists(&db_tx, cmd.family_id).await? {
                return Err(EngineError::NotFound("family".to_string()));
            }
            if !validate::member_in_family(&db_tx, cmd.member_id, cmd.family_id).await? {
                return Err(EngineError::IntegrityMismatch(
                    "member is not an active member of the family".to_string(),
                ));
            }
            if !validate::category_active_with_kind(
                &db_tx,
                cmd.category_id,
                cmd.kind.category_kind(),
            )
            .await?
            {
                return Err(EngineError::IntegrityMismatch(format!(
                    "category is not an active {} category",
                    cmd.kind.as_str()
                )));
            }

            let now = Utc::now();
            let tx = Transaction {
                id: Uuid::new_v4(),
                family_id: cmd.family_id,
                member_id: cmd.member_id,
                amount_minor,
                kind: cmd.kind,
                category_id: cmd.category_id,
                occurred_at,
                note,
                payment_method,
                status: TransactionStatus::Valid,
                created_at: now,
                updated_at: now,
                tags: Vec::new(),
            };
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx)
        })
    }

    /// Fetch a transaction by id, tags attached. Deleted transactions are
    /// reported as missing.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(&self.database)
            .await?;
        let model = match model {
            Some(model) if model.status != TransactionStatus::Deleted.as_str() => model,
            _ => return Err(EngineError::NotFound("transaction".to_string())),
        };
        let mut tx = Transaction::try_from(model)?;
        self.load_tags(std::slice::from_mut(&mut tx)).await?;
        Ok(tx)
    }

    /// List a family's valid transactions, newest occurrence first, with
    /// tags attached. `page` is 1-based. Returns the page and the total
    /// count of matching rows.
    pub async fn list_transactions(
        &self,
        family_id: Uuid,
        filter: &TransactionFilter,
        page: u64,
        per_page: u64,
    ) -> ResultEngine<(Vec<Transaction>, u64)> {
        let query = filter
            .apply(
                transactions::Entity::find()
                    .filter(transactions::Column::FamilyId.eq(family_id.to_string()))
                    .filter(transactions::Column::Status.eq(TransactionStatus::Valid.as_str())),
            )
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::CreatedAt);

        let paginator = query.paginate(&self.database, per_page.max(1));
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.max(1) - 1).await?;

        let mut out = models
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        self.load_tags(&mut out).await?;
        Ok((out, total))
    }

    /// Update a transaction. Absent fields keep their current value; the
    /// member/category checks run against the merged result.
    pub async fn update_transaction(&self, cmd: UpdateTransaction) -> ResultEngine<Transaction> {
        let note = optional_text(cmd.note.as_deref(), "note", NOTE_MAX)?;
        let payment_method =
            optional_text(cmd.payment_method.as_deref(), "payment method", PAYMENT_METHOD_MAX)?;

        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(cmd.transaction_id.to_string())
                .one(&db_tx)
                .await?;
            let current = match model {
                Some(model) if model.status == TransactionStatus::Valid.as_str() => {
                    Transaction::try_from(model)?
                }
                _ => return Err(EngineError::NotFound("transaction".to_string())),
            };

            let member_id = cmd.member_id.unwrap_or(current.member_id);
            let category_id = cmd.category_id.unwrap_or(current.category_id);
            let kind = cmd.kind.unwrap_or(current.kind);
            let amount_minor = checked_amount(cmd.amount_minor.unwrap_or(current.amount_minor))?;
            let occurred_at = checked_occurred_at(cmd.occurred_at.unwrap_or(current.occurred_at))?;

            if !validate::member_in_family(&db_tx, member_id, current.family_id).await? {
                return Err(EngineError::IntegrityMismatch(
                    "member is not an active member of the family".to_string(),
                ));
            }
            if !validate::category_active_with_kind(&db_tx, category_id, kind.category_kind())
                .await?
            {
                return Err(EngineError::IntegrityMismatch(format!(
                    "category is not an active {} category",
                    kind.as_str()
                )));
            }

            let mut active = transactions::ActiveModel {
                id: ActiveValue::Set(current.id.to_string()),
                member_id: ActiveValue::Set(member_id.to_string()),
                category_id: ActiveValue::Set(category_id.to_string()),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                amount_minor: ActiveValue::Set(amount_minor),
                occurred_at: ActiveValue::Set(occurred_at),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            if let Some(note) = note {
                active.note = ActiveValue::Set(Some(note));
            }
            if let Some(payment_method) = payment_method {
                active.payment_method = ActiveValue::Set(Some(payment_method));
            }
            let updated = active.update(&db_tx).await?;

            let mut tx = Transaction::try_from(updated)?;
            self.load_tags_with(&db_tx, std::slice::from_mut(&mut tx)).await?;
            Ok(tx)
        })
    }

    /// Soft-delete a transaction. The row and its tag links stay; the
    /// transaction disappears from listings and reports.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> ResultEngine<()> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(&self.database)
            .await?;
        let model = match model {
            Some(model) if model.status == TransactionStatus::Valid.as_str() => model,
            _ => return Err(EngineError::NotFound("transaction".to_string())),
        };

        let active = transactions::ActiveModel {
            id: ActiveValue::Set(model.id),
            status: ActiveValue::Set(TransactionStatus::Deleted.as_str().to_string()),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        active.update(&self.database).await?;
        Ok(())
    }

    /// Attach a tag to a transaction. Both must be active and belong to
    /// the same family; attaching an already-attached tag is refused.
    pub async fn tag_transaction(&self, transaction_id: Uuid, tag_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let tx_model = transactions::Entity::find_by_id(transaction_id.to_string())
                .one(&db_tx)
                .await?;
            let tx_model = match tx_model {
                Some(model) if model.status == TransactionStatus::Valid.as_str() => model,
                _ => return Err(EngineError::NotFound("transaction".to_string())),
            };

            let tag_model = tags::Entity::find_by_id(tag_id.to_string())
                .one(&db_tx)
                .await?;
            let Some(tag_model) = tag_model.filter(|t| t.is_active) else {
                return Err(EngineError::NotFound("tag".to_string()));
            };

            if tag_model.family_id != tx_model.family_id {
                return Err(EngineError::IntegrityMismatch(
                    "tag belongs to a different family".to_string(),
                ));
            }

            let existing = transaction_tags::Entity::find()
                .filter(transaction_tags::Column::TransactionId.eq(transaction_id.to_string()))
                .filter(transaction_tags::Column::TagId.eq(tag_id.to_string()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::Conflict(
                    "tag already attached to transaction".to_string(),
                ));
            }

            let link = transaction_tags::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                transaction_id: ActiveValue::Set(transaction_id.to_string()),
                tag_id: ActiveValue::Set(tag_id.to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            };
            link.insert(&db_tx).await?;
            Ok(())
        })
    }

    /// Detach a tag from a transaction. The link is removed for good; the
    /// same tag can be attached again afterwards.
    pub async fn untag_transaction(&self, transaction_id: Uuid, tag_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let tx_model = transactions::Entity::find_by_id(transaction_id.to_string())
                .one(&db_tx)
                .await?;
            if !matches!(&tx_model, Some(model) if model.status == TransactionStatus::Valid.as_str())
            {
                return Err(EngineError::NotFound("transaction".to_string()));
            }

            let link = transaction_tags::Entity::find()
                .filter(transaction_tags::Column::TransactionId.eq(transaction_id.to_string()))
                .filter(transaction_tags::Column::TagId.eq(tag_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("tag attachment".to_string()))?;

            link.delete(&db_tx).await?;
            Ok(())
        })
    }

    async fn load_tags(&self, txs: &mut [Transaction]) -> ResultEngine<()> {
        self.load_tags_with(&self.database, txs).await
    }

    /// Attach tags to the given transactions in one query.
    async fn load_tags_with<C: ConnectionTrait>(
        &self,
        db: &C,
        txs: &mut [Transaction],
    ) -> ResultEngine<()> {
        if txs.is_empty() {
            return Ok(());
        }
        let ids: Vec<String> = txs.iter().map(|tx| tx.id.to_string()).collect();
        let rows: Vec<(transaction_tags::Model, Option<tags::Model>)> =
            transaction_tags::Entity::find()
                .filter(transaction_tags::Column::TransactionId.is_in(ids))
                .find_also_related(tags::Entity)
                .all(db)
                .await?;

        let mut by_tx: HashMap<String, Vec<Tag>> = HashMap::new();
        for (link, tag_model) in rows {
            let Some(tag_model) = tag_model else { continue };
            by_tx
                .entry(link.transaction_id)
                .or_default()
                .push(Tag::try_from(tag_model)?);
        }

        for tx in txs {
            let mut attached = by_tx.remove(&tx.id.to_string()).unwrap_or_default();
            attached.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            tx.tags = attached;
        }
        Ok(())
    }
}
