//! Common test helpers shared across integration tests.

#![allow(dead_code)]
#![allow(missing_docs)]

use std::sync::Arc;

use lodestone_orm::{
    Column, FieldKind, Record, RecordRef, Registry, Schema, Session, Value, create_engine,
};

/// `users(id PK, name, age)` — the canonical test table.
pub fn user_schema() -> Arc<Schema> {
    Schema::new(
        "users",
        vec![
            Column::new("id", FieldKind::Integer).primary_key(),
            Column::new("name", FieldKind::String),
            Column::new("age", FieldKind::Integer),
        ],
    )
    .expect("declare users")
}

/// `posts(id PK, user_id, title)` for join tests.
pub fn post_schema() -> Arc<Schema> {
    Schema::new(
        "posts",
        vec![
            Column::new("id", FieldKind::Integer).primary_key(),
            Column::new("user_id", FieldKind::Integer),
            Column::new("title", FieldKind::String),
        ],
    )
    .expect("declare posts")
}

/// An in-memory session with the given tables created.
pub fn session_with(schemas: &[&Arc<Schema>]) -> Session {
    let store = create_engine("sqlite://:memory:").expect("open store");
    let mut registry = Registry::new();
    for schema in schemas {
        registry.register(Arc::clone(schema)).expect("register schema");
    }
    registry.create_all(&store).expect("create tables");
    Session::new(store)
}

/// A user instance ready for staging.
pub fn user(schema: &Arc<Schema>, name: &str, age: i64) -> RecordRef {
    Record::new(schema)
        .try_with("name", name)
        .expect("set name")
        .try_with("age", age)
        .expect("set age")
        .into_ref()
}

/// The `name` column of every record, in result order.
pub fn names(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| match r.get("name").expect("read name") {
            Value::Text(s) => s,
            other => panic!("expected text name, got {other:?}"),
        })
        .collect()
}
