use sea_orm::Database;

use engine::{Engine, EngineError, MemberRole, NewMember, UpdateMember};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

#[tokio::test]
async fn family_names_are_unique_case_insensitive() {
    let engine = engine_with_db().await;

    engine.create_family("Rossi").await.unwrap();
    let err = engine.create_family("  rossi ").await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn rename_family_checks_other_names_only() {
    let engine = engine_with_db().await;

    let rossi = engine.create_family("Rossi").await.unwrap();
    engine.create_family("Bianchi").await.unwrap();

    // Renaming to its own name (different case) is allowed.
    let renamed = engine.rename_family(rossi.id, "ROSSI").await.unwrap();
    assert_eq!(renamed.name, "ROSSI");

    let err = engine.rename_family(rossi.id, "bianchi").await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn family_fetch_includes_active_members_only() {
    let engine = engine_with_db().await;
    let family = engine.create_family("Rossi").await.unwrap();

    let anna = engine
        .create_member(NewMember::new(family.id, "Anna").role(MemberRole::Admin))
        .await
        .unwrap();
    let bruno = engine
        .create_member(NewMember::new(family.id, "Bruno"))
        .await
        .unwrap();

    engine.remove_member(bruno.id).await.unwrap();

    let fetched = engine.family(family.id).await.unwrap();
    assert_eq!(fetched.members.len(), 1);
    assert_eq!(fetched.members[0].id, anna.id);

    // The removed member is still fetchable directly, flagged inactive.
    let bruno = engine.member(bruno.id).await.unwrap();
    assert!(!bruno.is_active());
}

#[tokio::test]
async fn delete_family_blocked_by_active_members() {
    let engine = engine_with_db().await;
    let family = engine.create_family("Rossi").await.unwrap();
    let anna = engine
        .create_member(NewMember::new(family.id, "Anna"))
        .await
        .unwrap();

    let err = engine.delete_family(family.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    engine.remove_member(anna.id).await.unwrap();
    engine.delete_family(family.id).await.unwrap();

    let err = engine.family(family.id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn member_email_and_phone_are_globally_unique() {
    let engine = engine_with_db().await;
    let rossi = engine.create_family("Rossi").await.unwrap();
    let bianchi = engine.create_family("Bianchi").await.unwrap();

    engine
        .create_member(
            NewMember::new(rossi.id, "Anna")
                .email("anna@example.com")
                .phone("555-0100"),
        )
        .await
        .unwrap();

    // Same email in another family still collides.
    let err = engine
        .create_member(NewMember::new(bianchi.id, "Carla").email("anna@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let err = engine
        .create_member(NewMember::new(bianchi.id, "Carla").phone("555-0100"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn member_email_must_be_well_formed() {
    let engine = engine_with_db().await;
    let family = engine.create_family("Rossi").await.unwrap();

    let err = engine
        .create_member(NewMember::new(family.id, "Anna").email("not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn create_member_requires_existing_family() {
    let engine = engine_with_db().await;

    let err = engine
        .create_member(NewMember::new(uuid::Uuid::new_v4(), "Anna"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn update_member_touches_profile_fields_only() {
    let engine = engine_with_db().await;
    let family = engine.create_family("Rossi").await.unwrap();
    let anna = engine
        .create_member(NewMember::new(family.id, "Anna").role(MemberRole::Admin))
        .await
        .unwrap();

    let updated = engine
        .update_member(
            UpdateMember::new(anna.id)
                .name("Annalisa")
                .email("annalisa@example.com"),
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Annalisa");
    assert_eq!(updated.email.as_deref(), Some("annalisa@example.com"));
    assert_eq!(updated.role, MemberRole::Admin);

    let demoted = engine
        .change_member_role(anna.id, MemberRole::Viewer)
        .await
        .unwrap();
    assert_eq!(demoted.role, MemberRole::Viewer);
    assert_eq!(demoted.name, "Annalisa");
}
