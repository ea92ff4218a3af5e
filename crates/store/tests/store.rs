//! Integration tests for the SQLite store.

#![allow(missing_docs)]

use lodestone_store::{SqlValue, create_engine};

#[test]
fn unsupported_scheme_is_rejected() {
    let result = create_engine("postgres://localhost/app");
    let err = result.unwrap_err();
    assert!(err.to_string().contains("unsupported connection scheme"));
}

#[test]
fn in_memory_roundtrip() {
    let store = create_engine("sqlite://:memory:").expect("open store");

    let cursor = store
        .execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR, age INTEGER)", &[])
        .expect("create table");
    assert!(cursor.columns.is_empty());

    let cursor = store
        .execute(
            "INSERT INTO users (name, age) VALUES (?, ?)",
            &[SqlValue::Text("Alice".to_string()), SqlValue::Integer(30)],
        )
        .expect("insert");
    assert_eq!(cursor.rows_affected, 1);
    assert_eq!(cursor.lastrowid, 1);

    let cursor = store
        .execute(
            "INSERT INTO users (name, age) VALUES (?, ?)",
            &[SqlValue::Text("Bob".to_string()), SqlValue::Integer(25)],
        )
        .expect("insert");
    assert_eq!(cursor.lastrowid, 2);

    let cursor = store
        .execute("SELECT id, name, age FROM users ORDER BY name", &[])
        .expect("query");
    assert_eq!(cursor.columns, vec!["id", "name", "age"]);
    assert_eq!(cursor.rows.len(), 2);
    assert_eq!(cursor.rows[0][1], SqlValue::Text("Alice".to_string()));
    assert_eq!(cursor.rows[1][2], SqlValue::Integer(25));
}

#[test]
fn parameters_are_bound_not_interpolated() {
    let store = create_engine("sqlite://:memory:").expect("open store");
    store.execute("CREATE TABLE notes (body TEXT)", &[]).expect("create table");

    // A value full of SQL metacharacters must land verbatim.
    let hostile = "'; DROP TABLE notes; --".to_string();
    store
        .execute("INSERT INTO notes (body) VALUES (?)", &[SqlValue::Text(hostile.clone())])
        .expect("insert");

    let cursor = store.execute("SELECT body FROM notes", &[]).expect("query");
    assert_eq!(cursor.rows[0][0], SqlValue::Text(hostile));
}

#[test]
fn malformed_sql_propagates() {
    let store = create_engine("sqlite://:memory:").expect("open store");
    let result = store.execute("SELEKT * FROM nowhere", &[]);
    result.unwrap_err();
}

#[test]
fn commit_makes_dml_durable_on_file_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("app.db");
    let url = format!("sqlite://{}", path.display());

    let store = create_engine(&url).expect("open store");
    store
        .execute("CREATE TABLE items (id INTEGER PRIMARY KEY, name VARCHAR)", &[])
        .expect("create table");
    store
        .execute("INSERT INTO items (name) VALUES (?)", &[SqlValue::Text("widget".to_string())])
        .expect("insert");
    store.commit().expect("commit");
    store.close().expect("close");

    let store = create_engine(&url).expect("reopen store");
    let cursor = store.execute("SELECT name FROM items", &[]).expect("query");
    assert_eq!(cursor.rows.len(), 1);
    assert_eq!(cursor.rows[0][0], SqlValue::Text("widget".to_string()));
}

#[test]
fn uncommitted_dml_is_not_durable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("app.db");
    let url = format!("sqlite://{}", path.display());

    let store = create_engine(&url).expect("open store");
    store
        .execute("CREATE TABLE items (id INTEGER PRIMARY KEY, name VARCHAR)", &[])
        .expect("create table");
    store
        .execute("INSERT INTO items (name) VALUES (?)", &[SqlValue::Text("ghost".to_string())])
        .expect("insert");
    // Rolls the open implicit transaction back.
    drop(store);

    let store = create_engine(&url).expect("reopen store");
    let cursor = store.execute("SELECT name FROM items", &[]).expect("query");
    assert!(cursor.rows.is_empty());
}

#[test]
fn malformed_dml_does_not_open_a_transaction() {
    let store = create_engine("sqlite://:memory:").expect("open store");
    store.execute("CREATE TABLE items (id INTEGER PRIMARY KEY, name VARCHAR)", &[]).expect("create table");

    let result = store.execute("INSERT INTO items (nonexistent) VALUES (?)", &[SqlValue::Null]);
    result.unwrap_err();

    // If the failed statement had opened a transaction, this would commit it.
    let result = store.execute("COMMIT", &[]);
    result.unwrap_err();
}

#[test]
fn commit_without_open_transaction_is_a_noop() {
    let store = create_engine("sqlite://:memory:").expect("open store");
    store.commit().expect("commit");
    store.commit().expect("commit again");
}
