mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{count_named, setup, setup_with, unique, Person, Token};
use core_types::{Args, MockClock, Model};
use database::{DbError, DbOptions};
use std::sync::Arc;

#[tokio::test]
async fn model_lifecycle() {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    let clock = Arc::new(MockClock::new(t0));
    let Some(db) = setup_with(DbOptions::default().with_clock(clock.clone())).await else {
        return;
    };

    let mut person = Person::new("Grace", Some(unique("grace")));
    db.insert(&mut person).await.unwrap();
    assert!(!person.base.id.is_empty());
    assert_eq!(person.base.created_at, t0);
    assert_eq!(person.base.updated_at, t0);
    assert_eq!(person.base.deleted_at, None);

    let mut loaded = Person::default();
    db.select(&mut loaded, person.id()).await.unwrap();
    assert_eq!(loaded, person);

    clock.advance(Duration::minutes(5));
    person.name = "Grace Hopper".to_string();
    db.update(&mut person).await.unwrap();
    assert_eq!(person.base.created_at, t0);
    assert_eq!(person.base.updated_at, t0 + Duration::minutes(5));

    db.select(&mut loaded, person.id()).await.unwrap();
    assert_eq!(loaded.name, "Grace Hopper");
    assert_eq!(loaded.base.updated_at, t0 + Duration::minutes(5));

    clock.advance(Duration::minutes(5));
    db.delete(&mut person).await.unwrap();
    assert_eq!(person.base.deleted_at, Some(t0 + Duration::minutes(10)));

    // The select template hides soft-deleted rows; the destination is kept.
    let before = loaded.clone();
    let err = db.select(&mut loaded, person.id()).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(loaded, before);

    let err = db.update(&mut person).await.unwrap_err();
    assert!(err.is_not_found());

    db.hard_delete(&person).await.unwrap();
    let err = db.hard_delete(&person).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn select_missing_row() {
    let Some(db) = setup().await else { return };

    let mut person = Person::new("unchanged", None);
    let err = db.select(&mut person, &unique("missing")).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound));
    assert_eq!(person.name, "unchanged");
}

#[tokio::test]
async fn delete_missing_row_leaves_model_untouched() {
    let Some(db) = setup().await else { return };

    let mut person = Person::new("ghost", None);
    person.base.id = unique("ghost");
    let err = db.delete(&mut person).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(person.base.deleted_at, None);
}

#[tokio::test]
async fn exec_insert_keeps_caller_id() {
    let Some(db) = setup().await else { return };

    let id = unique("tok");
    let mut token = Token::new(&id, "first");
    db.insert(&mut token).await.unwrap();
    assert_eq!(token.id(), id);

    let mut loaded = Token::default();
    db.select(&mut loaded, &id).await.unwrap();
    assert_eq!(loaded.label, "first");
    assert_eq!(loaded.base.created_at, token.base.created_at);

    let mut duplicate = Token::new(&id, "second");
    let err = db.insert(&mut duplicate).await.unwrap_err();
    assert!(err.is_unique_violation());
}

#[tokio::test]
async fn unique_violation_is_classified() {
    let Some(db) = setup().await else { return };

    let email = unique("dup");
    let mut first = Person::new("first", Some(email.clone()));
    db.insert(&mut first).await.unwrap();

    let mut second = Person::new("second", Some(email));
    let err = db.insert(&mut second).await.unwrap_err();
    assert!(err.is_unique_violation());
    assert!(!err.is_not_found());
    assert!(second.base.id.is_empty());
}

#[tokio::test]
async fn batch_insert_is_atomic() {
    let Some(db) = setup().await else { return };

    let taken = unique("taken");
    let mut existing = Person::new("existing", Some(taken.clone()));
    db.insert(&mut existing).await.unwrap();

    let marker = unique("batch");
    let mut a = Person::new(&marker, Some(unique("a")));
    let mut b = Person::new(&marker, Some(taken));
    let mut c = Person::new(&marker, Some(unique("c")));
    let err = db.insert_batch(&mut [&mut a, &mut b, &mut c]).await.unwrap_err();
    assert!(err.is_unique_violation());
    assert_eq!(count_named(&db, &marker).await, 0);

    // Models before the failure keep what they were given in memory.
    assert!(!a.base.id.is_empty());
    assert!(c.base.id.is_empty());
}

#[tokio::test]
async fn batch_insert_shares_one_instant() {
    let Some(db) = setup().await else { return };

    let marker = unique("batch-ok");
    let mut a = Person::new(&marker, None);
    let mut b = Person::new(&marker, None);
    db.insert_batch(&mut [&mut a, &mut b]).await.unwrap();

    assert_ne!(a.base.id, b.base.id);
    assert_eq!(a.base.created_at, b.base.created_at);
    assert_eq!(count_named(&db, &marker).await, 2);
}

#[tokio::test]
async fn rebound_model_templates() {
    let Some(db) = setup_with(DbOptions::default().with_rebind_model(true)).await else {
        return;
    };

    let mut person = Person::new("legacy", Some(unique("legacy"))).legacy();
    db.insert(&mut person).await.unwrap();

    let mut loaded = Person::default().legacy();
    db.select(&mut loaded, person.id()).await.unwrap();
    assert_eq!(loaded.name, "legacy");

    db.delete(&mut person).await.unwrap();
    assert!(person.base.is_deleted());
    db.hard_delete(&person).await.unwrap();
}

#[tokio::test]
async fn general_statements() {
    let Some(db) = setup().await else { return };

    let email = unique("stmt");
    let mut person = Person::new("statements", Some(email.clone()));
    db.insert(&mut person).await.unwrap();

    let found: Person = db
        .rebind_query_row(
            "SELECT id, created_at, updated_at, deleted_at, name, email FROM person_test WHERE email = ?",
            Args::new().with(email.clone()),
        )
        .await
        .map(|row| sqlx::FromRow::from_row(&row).unwrap())
        .unwrap();
    assert_eq!(found.base.id, person.base.id);

    let all: Vec<Person> = db
        .get_all(
            "SELECT id, created_at, updated_at, deleted_at, name, email FROM person_test WHERE email = $1",
            Args::new().with(email.clone()),
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 1);

    let rows = db
        .named_query("SELECT name FROM person_test WHERE id = :id", &person.base)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    let result = db
        .named_exec(
            "UPDATE person_test SET name = :name WHERE email = :email",
            &Person::new("renamed", Some(email.clone())),
        )
        .await
        .unwrap();
    assert_eq!(result.rows_affected(), 1);

    let err = db
        .get::<Person>(
            "SELECT id, created_at, updated_at, deleted_at, name, email FROM person_test WHERE email = $1",
            Args::new().with(unique("nobody")),
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let statement = db.prepare("SELECT name FROM person_test WHERE id = $1").await.unwrap();
    assert_eq!(sqlx::Statement::columns(&statement).len(), 1);
}
