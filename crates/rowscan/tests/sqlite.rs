#![cfg(feature = "orm-sqlx")]

use futures::TryStreamExt;
use rowscan::{DatabasePool, Scanner, Statement};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct User {
    id: String,
    name: String,
    age: i64,
}

async fn connect() -> DatabasePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE users (id TEXT PRIMARY KEY, name TEXT NOT NULL, age INTEGER NOT NULL)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO users (id, name, age) VALUES ('1', 'A', 18), ('2', 'B', 30)")
        .execute(&pool)
        .await
        .unwrap();
    pool
}

#[tokio::test]
async fn it_fetches_users_from_sqlite() {
    let mut pool = connect().await;
    let scanner = Scanner::default();

    let statement = Statement::new("SELECT id, name, age FROM users WHERE id = ?").bind("2");
    let mut user = User::default();
    scanner
        .fetch_one(&mut pool, &mut user, &statement)
        .await
        .unwrap();
    assert_eq!(user.name, "B");
    assert_eq!(user.age, 30);

    let statement = Statement::new("SELECT id, name, age FROM users WHERE id = ?").bind("9");
    let err = scanner
        .fetch_one(&mut pool, &mut user, &statement)
        .await
        .unwrap_err();
    assert!(rowscan::is_not_found(&err));

    let statement = Statement::new("SELECT id, name, age FROM users ORDER BY id");
    let err = scanner
        .fetch_one(&mut pool, &mut user, &statement)
        .await
        .unwrap_err();
    assert!(err.is_cardinality());

    let mut users = Vec::<Arc<User>>::new();
    scanner
        .fetch_all_by_ref(&mut pool, &mut users, &statement)
        .await
        .unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, "1");

    let ages = scanner
        .stream_all::<i64, _>(&mut pool, &Statement::new("SELECT age FROM users ORDER BY age"))
        .try_collect::<Vec<_>>()
        .await
        .unwrap();
    assert_eq!(ages, [18, 30]);
}

#[tokio::test]
async fn it_converts_sqlite_rows_into_records() {
    let mut pool = connect().await;
    let statement = Statement::new(
        "SELECT id, age, NULL AS note, '{\"a\":1}' AS extra FROM users WHERE id = '1'",
    );
    let mut record = Map::<String, JsonValue>::new();
    Scanner::default()
        .fetch_one(&mut pool, &mut record, &statement)
        .await
        .unwrap();
    assert_eq!(record.get("age"), Some(&json!(18)));
    assert_eq!(record.get("note"), Some(&JsonValue::Null));
    assert_eq!(record.get("extra"), Some(&json!("{\"a\":1}")));
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Note {
    id: String,
    body: String,
    tags: Vec<String>,
}

#[tokio::test]
async fn it_keeps_text_columns_as_strings() {
    let mut pool = connect().await;
    sqlx::query("CREATE TABLE notes (id TEXT PRIMARY KEY, body TEXT NOT NULL, tags TEXT)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO notes (id, body, tags) VALUES ('1', '[1]', '[\"a\", \"b\"]')")
        .execute(&pool)
        .await
        .unwrap();

    let statement = Statement::new("SELECT id, body, tags FROM notes WHERE id = ?").bind("1");
    let mut note = Note::default();
    Scanner::default()
        .fetch_one(&mut pool, &mut note, &statement)
        .await
        .unwrap();
    assert_eq!(note.body, "[1]");
    assert_eq!(note.tags, ["a", "b"]);
}

#[tokio::test]
async fn it_reads_rows_returned_by_updates_in_a_transaction() {
    let pool = connect().await;
    let scanner = Scanner::default();

    let statement =
        Statement::new("UPDATE users SET age = age + 1 WHERE id = ? RETURNING id, name, age")
            .bind("1");
    let mut user = User::default();
    scanner
        .fetch_one_in_txn(&pool, &mut user, &statement)
        .await
        .unwrap();
    assert_eq!(user.age, 19);

    let statement = Statement::new("UPDATE users SET age = 0 RETURNING id, name, age");
    let err = scanner
        .fetch_one_in_txn(&pool, &mut user, &statement)
        .await
        .unwrap_err();
    assert!(err.is_transaction());
    assert!(err.is_cardinality());

    let mut ages = Vec::<i64>::new();
    let mut pool = pool;
    scanner
        .fetch_all(&mut pool, &mut ages, &Statement::new("SELECT age FROM users ORDER BY id"))
        .await
        .unwrap();
    assert_eq!(ages, [19, 30]);
}

#[tokio::test]
async fn it_reports_the_failing_transaction_phase() {
    let pool = connect().await;
    pool.close().await;

    let statement = Statement::new("UPDATE users SET age = 0 WHERE id = '1' RETURNING age");
    let mut age = 0_i64;
    let err = Scanner::default()
        .fetch_one_in_txn(&pool, &mut age, &statement)
        .await
        .unwrap_err();
    assert!(err.is_transaction());
    assert!(!err.is_not_found());
    assert_eq!(err.message(), "fail to run the read-write transaction");
    assert_eq!(
        err.source().map(|err| err.message()),
        Some("fail to begin the transaction")
    );
}
