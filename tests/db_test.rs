// Tests for the journal database

use asit_daily::db::{
    Database, DoseRepository, NewDoseRecord, Severity, SideEffectKind, SideEffectRepository,
    TherapyRepository,
};
use asit_daily::schedule::Concentration;
use chrono::NaiveDate;
use tempfile::TempDir;

fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(db_path).unwrap();
    (db, temp_dir)
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

fn taken(day: u32, clicks: u32) -> NewDoseRecord {
    NewDoseRecord {
        date: date(day),
        taken: true,
        dose_count: Some(clicks),
        concentration: Some(Concentration::Low),
        notes: None,
        prescribed_clicks: Some(clicks),
    }
}

#[tokio::test]
async fn test_database_initialization() {
    let (db, _temp) = create_test_db();
    let conn = db.lock().await;

    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
             AND name IN ('therapy_sessions', 'doses', 'side_effects')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 3);

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[tokio::test]
async fn test_reopen_keeps_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("journal.db");

    {
        let repo = TherapyRepository::new(Database::new(&db_path).unwrap());
        repo.create("default", date(1), 6, "09:00").await.unwrap();
    }

    let repo = TherapyRepository::new(Database::new(&db_path).unwrap());
    let session = repo.get_by_profile("default").await.unwrap().unwrap();
    assert_eq!(session.start_date, date(1));
}

#[tokio::test]
async fn test_create_and_get_session() {
    let (db, _temp) = create_test_db();
    let repo = TherapyRepository::new(db);

    let created = repo.create("default", date(1), 6, "08:30").await.unwrap();
    assert!(!created.id.is_empty());

    let session = repo.get_by_profile("default").await.unwrap().unwrap();
    assert_eq!(session.id, created.id);
    assert_eq!(session.start_date, date(1));
    assert_eq!(session.maintenance_dose, 6);
    assert_eq!(session.reminder_time, "08:30");
}

#[tokio::test]
async fn test_session_not_found() {
    let (db, _temp) = create_test_db();
    let repo = TherapyRepository::new(db);

    assert!(repo.get_by_profile("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_one_session_per_profile() {
    let (db, _temp) = create_test_db();
    let repo = TherapyRepository::new(db);

    repo.create("default", date(1), 6, "09:00").await.unwrap();
    assert!(repo.create("default", date(2), 5, "09:00").await.is_err());
    assert!(repo.create("other", date(2), 5, "09:00").await.is_ok());
}

#[tokio::test]
async fn test_update_settings() {
    let (db, _temp) = create_test_db();
    let repo = TherapyRepository::new(db);

    let session = repo.create("default", date(1), 6, "09:00").await.unwrap();
    repo.update_settings(&session.id, 8, "20:15").await.unwrap();

    let updated = repo.get_by_profile("default").await.unwrap().unwrap();
    assert_eq!(updated.maintenance_dose, 8);
    assert_eq!(updated.reminder_time, "20:15");
    assert_eq!(updated.start_date, date(1));

    assert!(repo.update_settings("missing", 8, "20:15").await.is_err());
}

#[tokio::test]
async fn test_upsert_overwrites_same_day() {
    let (db, _temp) = create_test_db();
    let session = TherapyRepository::new(db.clone())
        .create("default", date(1), 6, "09:00")
        .await
        .unwrap();
    let repo = DoseRepository::new(db);

    let first = repo.upsert(&session.id, taken(3, 3)).await.unwrap();
    let second = repo
        .upsert(
            &session.id,
            NewDoseRecord {
                date: date(3),
                taken: false,
                dose_count: None,
                concentration: None,
                notes: Some("felt unwell".to_string()),
                prescribed_clicks: Some(3),
            },
        )
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert!(!second.taken);
    assert_eq!(second.dose_count, None);
    assert_eq!(second.notes.as_deref(), Some("felt unwell"));

    let all = repo.list_all(&session.id).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_get_by_date_and_id() {
    let (db, _temp) = create_test_db();
    let session = TherapyRepository::new(db.clone())
        .create("default", date(1), 6, "09:00")
        .await
        .unwrap();
    let repo = DoseRepository::new(db);

    let stored = repo.upsert(&session.id, taken(2, 2)).await.unwrap();

    let by_date = repo.get_by_date(&session.id, date(2)).await.unwrap().unwrap();
    assert_eq!(by_date, stored);
    assert_eq!(by_date.concentration, Some(Concentration::Low));

    let by_id = repo.get(&stored.id).await.unwrap().unwrap();
    assert_eq!(by_id.date, date(2));

    assert!(repo.get_by_date(&session.id, date(9)).await.unwrap().is_none());
    assert!(repo.get("nonexistent-id").await.unwrap().is_none());
}

#[tokio::test]
async fn test_history_order_and_limit() {
    let (db, _temp) = create_test_db();
    let session = TherapyRepository::new(db.clone())
        .create("default", date(1), 6, "09:00")
        .await
        .unwrap();
    let repo = DoseRepository::new(db);

    for day in [3, 1, 5, 2, 4] {
        repo.upsert(&session.id, taken(day, day)).await.unwrap();
    }

    let history = repo.history(&session.id, 3).await.unwrap();
    let dates: Vec<_> = history.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![date(5), date(4), date(3)]);

    let all = repo.list_all(&session.id).await.unwrap();
    assert_eq!(all.first().unwrap().date, date(1));
    assert_eq!(all.last().unwrap().date, date(5));

    let unbounded = repo.history(&session.id, usize::MAX).await.unwrap();
    assert_eq!(unbounded.len(), 5);
    assert_eq!(unbounded[0].date, date(5));

    let range = repo.list_range(&session.id, date(2), date(4)).await.unwrap();
    assert_eq!(range.len(), 3);
    assert_eq!(range[0].date, date(2));
}

#[tokio::test]
async fn test_records_are_scoped_to_session() {
    let (db, _temp) = create_test_db();
    let therapy = TherapyRepository::new(db.clone());
    let a = therapy.create("a", date(1), 6, "09:00").await.unwrap();
    let b = therapy.create("b", date(1), 6, "09:00").await.unwrap();
    let repo = DoseRepository::new(db);

    repo.upsert(&a.id, taken(1, 1)).await.unwrap();
    repo.upsert(&b.id, taken(1, 1)).await.unwrap();

    assert_eq!(repo.list_all(&a.id).await.unwrap().len(), 1);
    assert_eq!(repo.list_all(&b.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_side_effects() {
    let (db, _temp) = create_test_db();
    let session = TherapyRepository::new(db.clone())
        .create("default", date(1), 6, "09:00")
        .await
        .unwrap();
    let doses = DoseRepository::new(db.clone());
    let repo = SideEffectRepository::new(db);

    let dose = doses.upsert(&session.id, taken(1, 1)).await.unwrap();
    repo.create(&dose.id, date(1), SideEffectKind::Itching, Severity::Mild, None)
        .await
        .unwrap();
    repo.create(
        &dose.id,
        date(2),
        SideEffectKind::Swelling,
        Severity::Moderate,
        Some("lip".to_string()),
    )
    .await
    .unwrap();

    let effects = repo.list_for_session(&session.id).await.unwrap();
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0].kind, SideEffectKind::Swelling);
    assert_eq!(effects[0].description.as_deref(), Some("lip"));
    assert_eq!(effects[1].severity, Severity::Mild);
}

#[tokio::test]
async fn test_side_effect_requires_dose_record() {
    let (db, _temp) = create_test_db();
    let repo = SideEffectRepository::new(db);

    let result = repo
        .create("no-such-dose", date(1), SideEffectKind::Other, Severity::Severe, None)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_unknown_concentration_is_an_error() {
    let (db, _temp) = create_test_db();
    let session = TherapyRepository::new(db.clone())
        .create("default", date(1), 6, "09:00")
        .await
        .unwrap();
    let repo = DoseRepository::new(db.clone());

    let record = repo.upsert(&session.id, taken(2, 2)).await.unwrap();
    db.lock()
        .await
        .execute(
            "UPDATE doses SET concentration = 'medium' WHERE id = ?1",
            [&record.id],
        )
        .unwrap();

    assert!(repo.get_by_date(&session.id, date(2)).await.is_err());
    assert!(repo.list_all(&session.id).await.is_err());
}

#[tokio::test]
async fn test_unknown_side_effect_values_are_errors() {
    let (db, _temp) = create_test_db();
    let session = TherapyRepository::new(db.clone())
        .create("default", date(1), 6, "09:00")
        .await
        .unwrap();
    let dose = DoseRepository::new(db.clone())
        .upsert(&session.id, taken(1, 1))
        .await
        .unwrap();
    let repo = SideEffectRepository::new(db.clone());

    let effect = repo
        .create(&dose.id, date(1), SideEffectKind::Redness, Severity::Severe, None)
        .await
        .unwrap();
    db.lock()
        .await
        .execute(
            "UPDATE side_effects SET kind = 'headache' WHERE id = ?1",
            [&effect.id],
        )
        .unwrap();
    assert!(repo.list_for_session(&session.id).await.is_err());

    db.lock()
        .await
        .execute(
            "UPDATE side_effects SET kind = 'redness', severity = 'extreme' WHERE id = ?1",
            [&effect.id],
        )
        .unwrap();
    assert!(repo.list_for_session(&session.id).await.is_err());

    db.lock()
        .await
        .execute(
            "UPDATE side_effects SET severity = 'severe' WHERE id = ?1",
            [&effect.id],
        )
        .unwrap();
    let effects = repo.list_for_session(&session.id).await.unwrap();
    assert_eq!(effects[0].kind, SideEffectKind::Redness);
    assert_eq!(effects[0].severity, Severity::Severe);
}
