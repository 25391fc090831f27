use chrono::{Duration, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    CategoryKind, Engine, EngineError, NewCategory, NewMember, NewTag, NewTransaction,
    TransactionFilter, TransactionKind, UpdateTransaction,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

/// A family with one member and one active category per kind.
async fn seed(engine: &Engine) -> (Uuid, Uuid, Uuid, Uuid) {
    let family = engine.create_family("Rossi").await.unwrap();
    let member = engine
        .create_member(NewMember::new(family.id, "Anna"))
        .await
        .unwrap();
    let expense = engine
        .create_category(NewCategory::new("Food", CategoryKind::Expense))
        .await
        .unwrap();
    let income = engine
        .create_category(NewCategory::new("Salary", CategoryKind::Income))
        .await
        .unwrap();
    (family.id, member.id, expense.id, income.id)
}

#[tokio::test]
async fn create_validates_amount_and_date() {
    let engine = engine_with_db().await;
    let (family_id, member_id, expense_id, _) = seed(&engine).await;

    let err = engine
        .create_transaction(NewTransaction::new(
            family_id,
            member_id,
            0,
            TransactionKind::Expense,
            expense_id,
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .create_transaction(NewTransaction::new(
            family_id,
            member_id,
            1250,
            TransactionKind::Expense,
            expense_id,
            Utc::now() + Duration::hours(1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn create_checks_member_and_category_consistency() {
    let engine = engine_with_db().await;
    let (family_id, member_id, expense_id, income_id) = seed(&engine).await;

    // Member of another family.
    let other = engine.create_family("Bianchi").await.unwrap();
    let outsider = engine
        .create_member(NewMember::new(other.id, "Carla"))
        .await
        .unwrap();
    let err = engine
        .create_transaction(NewTransaction::new(
            family_id,
            outsider.id,
            1250,
            TransactionKind::Expense,
            expense_id,
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::IntegrityMismatch(_)));

    // Kind and category kind must agree.
    let err = engine
        .create_transaction(NewTransaction::new(
            family_id,
            member_id,
            1250,
            TransactionKind::Expense,
            income_id,
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::IntegrityMismatch(_)));

    let err = engine
        .create_transaction(NewTransaction::new(
            Uuid::new_v4(),
            member_id,
            1250,
            TransactionKind::Expense,
            expense_id,
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn deleted_transactions_disappear_from_fetch_and_listing() {
    let engine = engine_with_db().await;
    let (family_id, member_id, expense_id, _) = seed(&engine).await;

    let kept = engine
        .create_transaction(NewTransaction::new(
            family_id,
            member_id,
            1000,
            TransactionKind::Expense,
            expense_id,
            Utc::now() - Duration::days(2),
        ))
        .await
        .unwrap();
    let dropped = engine
        .create_transaction(NewTransaction::new(
            family_id,
            member_id,
            2000,
            TransactionKind::Expense,
            expense_id,
            Utc::now() - Duration::days(1),
        ))
        .await
        .unwrap();

    engine.delete_transaction(dropped.id).await.unwrap();

    let err = engine.transaction(dropped.id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    let err = engine.delete_transaction(dropped.id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let (page, total) = engine
        .list_transactions(family_id, &TransactionFilter::default(), 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, kept.id);
}

#[tokio::test]
async fn listing_orders_newest_first_and_paginates() {
    let engine = engine_with_db().await;
    let (family_id, member_id, expense_id, _) = seed(&engine).await;

    let mut ids = Vec::new();
    for day in 1..=5 {
        let tx = engine
            .create_transaction(NewTransaction::new(
                family_id,
                member_id,
                100 * day,
                TransactionKind::Expense,
                expense_id,
                Utc::now() - Duration::days(day),
            ))
            .await
            .unwrap();
        ids.push(tx.id);
    }

    let (first, total) = engine
        .list_transactions(family_id, &TransactionFilter::default(), 1, 2)
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(first.len(), 2);
    // Most recent occurrence first: day 1, then day 2.
    assert_eq!(first[0].id, ids[0]);
    assert_eq!(first[1].id, ids[1]);

    let (last, _) = engine
        .list_transactions(family_id, &TransactionFilter::default(), 3, 2)
        .await
        .unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].id, ids[4]);
}

#[tokio::test]
async fn listing_applies_filters() {
    let engine = engine_with_db().await;
    let (family_id, member_id, expense_id, _) = seed(&engine).await;
    let bruno = engine
        .create_member(NewMember::new(family_id, "Bruno"))
        .await
        .unwrap();

    engine
        .create_transaction(
            NewTransaction::new(
                family_id,
                member_id,
                500,
                TransactionKind::Expense,
                expense_id,
                Utc::now() - Duration::days(10),
            )
            .payment_method("cash"),
        )
        .await
        .unwrap();
    let card = engine
        .create_transaction(
            NewTransaction::new(
                family_id,
                bruno.id,
                700,
                TransactionKind::Expense,
                expense_id,
                Utc::now() - Duration::days(3),
            )
            .payment_method("card"),
        )
        .await
        .unwrap();

    let filter = TransactionFilter::default().member(bruno.id);
    let (page, total) = engine
        .list_transactions(family_id, &filter, 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].id, card.id);

    let filter = TransactionFilter::default().payment_method("card");
    let (page, _) = engine
        .list_transactions(family_id, &filter, 1, 20)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, card.id);

    let filter = TransactionFilter::default().occurred_after(Utc::now() - Duration::days(5));
    let (page, _) = engine
        .list_transactions(family_id, &filter, 1, 20)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, card.id);
}

#[tokio::test]
async fn update_revalidates_the_merged_transaction() {
    let engine = engine_with_db().await;
    let (family_id, member_id, expense_id, income_id) = seed(&engine).await;

    let tx = engine
        .create_transaction(NewTransaction::new(
            family_id,
            member_id,
            1000,
            TransactionKind::Expense,
            expense_id,
            Utc::now() - Duration::days(1),
        ))
        .await
        .unwrap();

    let updated = engine
        .update_transaction(
            UpdateTransaction::new(tx.id)
                .amount_minor(1500)
                .note("weekly shop"),
        )
        .await
        .unwrap();
    assert_eq!(updated.amount_minor, 1500);
    assert_eq!(updated.note.as_deref(), Some("weekly shop"));
    assert!(updated.updated_at >= tx.updated_at);

    // Flipping the kind alone leaves it pointing at an expense category.
    let err = engine
        .update_transaction(UpdateTransaction::new(tx.id).kind(TransactionKind::Income))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::IntegrityMismatch(_)));

    // Kind and category moved together is accepted.
    let switched = engine
        .update_transaction(
            UpdateTransaction::new(tx.id)
                .kind(TransactionKind::Income)
                .category(income_id),
        )
        .await
        .unwrap();
    assert_eq!(switched.kind, TransactionKind::Income);
    assert_eq!(switched.category_id, income_id);
}

#[tokio::test]
async fn tag_attach_detach_lifecycle() {
    let engine = engine_with_db().await;
    let (family_id, member_id, expense_id, _) = seed(&engine).await;

    let tx = engine
        .create_transaction(NewTransaction::new(
            family_id,
            member_id,
            1000,
            TransactionKind::Expense,
            expense_id,
            Utc::now() - Duration::days(1),
        ))
        .await
        .unwrap();
    let tag = engine
        .create_tag(NewTag::new(family_id, "vacation", "trip").color("#00FF00"))
        .await
        .unwrap();

    engine.tag_transaction(tx.id, tag.id).await.unwrap();

    let err = engine.tag_transaction(tx.id, tag.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let fetched = engine.transaction(tx.id).await.unwrap();
    assert_eq!(fetched.tags.len(), 1);
    assert_eq!(fetched.tags[0].id, tag.id);

    engine.untag_transaction(tx.id, tag.id).await.unwrap();
    let err = engine.untag_transaction(tx.id, tag.id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    // Detach is final but not fatal: re-attaching works.
    engine.tag_transaction(tx.id, tag.id).await.unwrap();
    let fetched = engine.transaction(tx.id).await.unwrap();
    assert_eq!(fetched.tags.len(), 1);
}

#[tokio::test]
async fn tags_cannot_cross_families() {
    let engine = engine_with_db().await;
    let (family_id, member_id, expense_id, _) = seed(&engine).await;
    let other = engine.create_family("Bianchi").await.unwrap();

    let tx = engine
        .create_transaction(NewTransaction::new(
            family_id,
            member_id,
            1000,
            TransactionKind::Expense,
            expense_id,
            Utc::now() - Duration::days(1),
        ))
        .await
        .unwrap();
    let foreign = engine
        .create_tag(NewTag::new(other.id, "vacation", "trip"))
        .await
        .unwrap();

    let err = engine.tag_transaction(tx.id, foreign.id).await.unwrap_err();
    assert!(matches!(err, EngineError::IntegrityMismatch(_)));
}

#[tokio::test]
async fn tag_names_unique_within_family_only() {
    let engine = engine_with_db().await;
    let (family_id, _, _, _) = seed(&engine).await;
    let other = engine.create_family("Bianchi").await.unwrap();

    engine
        .create_tag(NewTag::new(family_id, "Vacation", "trip"))
        .await
        .unwrap();
    let err = engine
        .create_tag(NewTag::new(family_id, " vacation ", "trip"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // Same name in another family is fine.
    engine
        .create_tag(NewTag::new(other.id, "Vacation", "trip"))
        .await
        .unwrap();
}

#[tokio::test]
async fn tag_color_must_be_hex() {
    let engine = engine_with_db().await;
    let (family_id, _, _, _) = seed(&engine).await;

    let err = engine
        .create_tag(NewTag::new(family_id, "vacation", "trip").color("green"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .create_tag(NewTag::new(family_id, "vacation", "trip").color("#12345G"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn delete_tag_blocked_while_attached() {
    let engine = engine_with_db().await;
    let (family_id, member_id, expense_id, _) = seed(&engine).await;

    let tx = engine
        .create_transaction(NewTransaction::new(
            family_id,
            member_id,
            1000,
            TransactionKind::Expense,
            expense_id,
            Utc::now() - Duration::days(1),
        ))
        .await
        .unwrap();
    let tag = engine
        .create_tag(NewTag::new(family_id, "vacation", "trip"))
        .await
        .unwrap();
    engine.tag_transaction(tx.id, tag.id).await.unwrap();

    let err = engine.delete_tag(tag.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    engine.untag_transaction(tx.id, tag.id).await.unwrap();
    engine.delete_tag(tag.id).await.unwrap();

    assert!(engine.family_tags(family_id).await.unwrap().is_empty());
    let err = engine.tag(tag.id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
