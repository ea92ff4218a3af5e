//! Integration tests for the unit-of-work session.

#![allow(missing_docs)]

mod common;

use common::{names, session_with, user, user_schema};
use lodestone_orm::{Column, FieldKind, Record, Schema, Value};

#[test]
fn insert_then_query_returns_exactly_the_inserted_records() {
    let users = user_schema();
    let mut session = session_with(&[&users]);

    session.add_all([user(&users, "Alice", 30), user(&users, "Bob", 25)]);
    session.commit().expect("commit");

    let all = session.query(&users).all().expect("query all");
    let mut found = names(&all);
    found.sort();
    assert_eq!(found, vec!["Alice", "Bob"]);
}

#[test]
fn generated_primary_key_lands_on_the_instance() {
    let users = user_schema();
    let mut session = session_with(&[&users]);

    let alice = user(&users, "Alice", 30);
    let bob = user(&users, "Bob", 25);
    assert_eq!(alice.borrow().get("id").unwrap(), Value::Null);

    session.add_all([alice.clone(), bob.clone()]);
    session.commit().expect("commit");

    assert_eq!(alice.borrow().get("id").unwrap(), Value::Integer(1));
    assert_eq!(bob.borrow().get("id").unwrap(), Value::Integer(2));
}

#[test]
fn flushed_instances_are_not_reflushed() {
    let users = user_schema();
    let mut session = session_with(&[&users]);

    session.add(user(&users, "Alice", 30));
    session.commit().expect("first commit");
    // Nothing pending; a second commit must not re-insert.
    session.commit().expect("second commit");

    let all = session.query(&users).all().expect("query all");
    assert_eq!(all.len(), 1);
}

#[test]
fn adding_a_persisted_instance_stages_an_update() {
    let users = user_schema();
    let mut session = session_with(&[&users]);

    let alice = user(&users, "Alice", 30);
    session.add(alice.clone());
    session.commit().expect("commit insert");

    alice.borrow_mut().set("age", 31).expect("set age");
    session.add(alice);
    session.commit().expect("commit update");

    let all = session.query(&users).all().expect("query all");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].get("age").unwrap(), Value::Integer(31));
}

#[test]
fn zero_primary_key_counts_as_assigned() {
    let users = user_schema();
    let mut session = session_with(&[&users]);

    // id = 0 is a legitimate key value, so this stages an update of a row
    // that does not exist -- not an insert.
    let phantom = Record::new(&users)
        .try_with("id", 0)
        .unwrap()
        .try_with("name", "Nobody")
        .unwrap()
        .into_ref();
    session.add(phantom);
    session.commit().expect("commit");

    let all = session.query(&users).all().expect("query all");
    assert!(all.is_empty());
}

#[test]
fn update_convenience_stages_and_flushes() {
    let users = user_schema();
    let mut session = session_with(&[&users]);

    let alice = user(&users, "Alice", 30);
    session.add(alice.clone());
    session.commit().expect("commit insert");

    session
        .update(&alice, &[("name", Value::from("Alicia")), ("age", Value::from(31))])
        .expect("stage update");
    session.commit().expect("commit update");

    let found = session
        .query(&users)
        .filter_by("name", "Alicia")
        .first()
        .expect("query")
        .expect("row present");
    assert_eq!(found.get("age").unwrap(), Value::Integer(31));
}

#[test]
fn delete_convenience_removes_the_row() {
    let users = user_schema();
    let mut session = session_with(&[&users]);

    let alice = user(&users, "Alice", 30);
    let bob = user(&users, "Bob", 25);
    session.add_all([alice, bob.clone()]);
    session.commit().expect("commit insert");

    session.delete(&bob);
    session.commit().expect("commit delete");

    let all = session.query(&users).all().expect("query all");
    assert_eq!(names(&all), vec!["Alice"]);
}

#[test]
fn flush_order_is_new_then_dirty_then_deleted() {
    let users = user_schema();
    let mut session = session_with(&[&users]);

    let alice = user(&users, "Alice", 30);
    let bob = user(&users, "Bob", 25);
    session.add_all([alice.clone(), bob.clone()]);
    session.commit().expect("seed");

    // Stage one of each kind in reverse of the flush order.
    session.delete(&bob);
    alice.borrow_mut().set("age", 31).expect("set age");
    session.add(alice);
    let carol = user(&users, "Carol", 41);
    session.add(carol);
    session.commit().expect("mixed commit");

    let all = session.query(&users).order_by("name").all().expect("query all");
    assert_eq!(names(&all), vec!["Alice", "Carol"]);
    assert_eq!(all[0].get("age").unwrap(), Value::Integer(31));
}

#[test]
fn flush_makes_rows_visible_before_commit() {
    let users = user_schema();
    let mut session = session_with(&[&users]);

    session.add(user(&users, "Alice", 30));
    session.flush().expect("flush");

    // Same connection, same open transaction.
    let all = session.query(&users).all().expect("query all");
    assert_eq!(all.len(), 1);
}

#[test]
fn staging_is_exclusive_across_sets() {
    let users = user_schema();
    let mut session = session_with(&[&users]);

    let alice = user(&users, "Alice", 30);
    session.add(alice.clone());
    session.commit().expect("commit insert");

    // Re-staging as deleted must win over the earlier dirty staging.
    alice.borrow_mut().set("age", 31).expect("set age");
    session.add(alice.clone());
    session.delete(&alice);
    session.commit().expect("commit delete");

    let all = session.query(&users).all().expect("query all");
    assert!(all.is_empty());
}

#[test]
fn flush_failure_leaves_the_remainder_pending() {
    let users = user_schema();
    let mut session = session_with(&[&users]);

    // A second declaration of the same table with a column the created
    // table does not have; inserting through it fails at the store.
    let stale_users = Schema::new(
        "users",
        vec![
            Column::new("id", FieldKind::Integer).primary_key(),
            Column::new("name", FieldKind::String),
            Column::new("email", FieldKind::String),
        ],
    )
    .expect("declare stale users");
    let broken = Record::new(&stale_users)
        .try_with("name", "Mallory")
        .unwrap()
        .try_with("email", "m@example.com")
        .unwrap()
        .into_ref();

    let alice = user(&users, "Alice", 30);
    let carol = user(&users, "Carol", 41);
    session.add(alice);
    session.add(broken.clone());
    session.add(carol);

    // The failure propagates; instances ahead of it were executed, the
    // failed one and everything behind it stay pending.
    session.flush().unwrap_err();
    let flushed = session.query(&users).all().expect("query all");
    assert_eq!(names(&flushed), vec!["Alice"]);

    // Unstage the broken instance and the remainder flushes cleanly.
    session.delete(&broken);
    session.commit().expect("commit remainder");

    let all = session.query(&users).order_by("name").all().expect("query all");
    assert_eq!(names(&all), vec!["Alice", "Carol"]);
}

#[test]
fn update_without_primary_key_is_skipped_with_a_warning() {
    let log = Schema::new(
        "audit_log",
        vec![
            Column::new("entry", FieldKind::Text),
            Column::new("level", FieldKind::Integer),
        ],
    )
    .expect("declare audit_log");
    let mut session = session_with(&[&log]);

    let entry = Record::new(&log)
        .try_with("entry", "boot")
        .unwrap()
        .try_with("level", 1)
        .unwrap()
        .into_ref();
    session.add(entry.clone());
    session.commit().expect("commit insert");

    // No primary key to address the row with: the staged update is dropped,
    // the flush still succeeds, and the stored row is untouched.
    session.update(&entry, &[("level", Value::from(2))]).expect("stage update");
    session.commit().expect("commit update");

    let all = session.query(&log).all().expect("query all");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].get("level").unwrap(), Value::Integer(1));
}
