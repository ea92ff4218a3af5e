//! Minimal object-relational mapper over an embedded SQLite store.
//!
//! Declares typed record schemas, tracks in-memory record mutations in a
//! unit-of-work session, and compiles fluent queries into parameterized SQL.
//! Built for the single-connection, single-process case.
//!
//! # Quick Start
//!
//! ```
//! use lodestone_orm::{
//!     Column, FieldKind, Filter, Record, Registry, Schema, Session, Value, create_engine,
//! };
//!
//! # fn main() -> lodestone_orm::Result<()> {
//! // Declare a schema and materialize its table.
//! let user = Schema::new(
//!     "users",
//!     vec![
//!         Column::new("id", FieldKind::Integer).primary_key(),
//!         Column::new("name", FieldKind::String),
//!         Column::new("age", FieldKind::Integer),
//!     ],
//! )?;
//!
//! let store = create_engine("sqlite://:memory:")?;
//! let mut registry = Registry::new();
//! registry.register(user.clone())?;
//! registry.create_all(&store)?;
//!
//! // Stage and flush instances through a session.
//! let mut session = Session::new(store);
//! let alice = Record::new(&user).try_with("name", "Alice")?.try_with("age", 30)?.into_ref();
//! let bob = Record::new(&user).try_with("name", "Bob")?.try_with("age", 25)?.into_ref();
//! session.add_all([alice.clone(), bob]);
//! session.commit()?;
//!
//! // The store-generated identity lands back on the instance.
//! assert_eq!(alice.borrow().get("id")?, Value::Integer(1));
//!
//! // Query back with typed filters.
//! let young = session.query(&user).filter(Filter::lt("age", 30)).all()?;
//! assert_eq!(young.len(), 1);
//! assert_eq!(young[0].get("name")?, Value::from("Bob"));
//!
//! session.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Updating
//!
//! Either mutate an instance and re-stage it:
//!
//! ```ignore
//! alice.borrow_mut().set("age", 31)?;
//! session.add(alice.clone());
//! session.commit()?;
//! ```
//!
//! or update through a query:
//!
//! ```ignore
//! session.query(&user).filter_by("name", "Alice").set("age", 31).update()?;
//! session.commit()?;
//! ```

mod error;
mod field;
mod filter;
mod query;
mod registry;
mod schema;
mod session;

pub use error::{Error, Result};
pub use field::{FieldKind, Value};
pub use filter::{ColumnRef, CompareOp, Filter, JoinOn, Order};
// Re-export the store surface so callers need only this crate.
pub use lodestone_store::{Cursor, SqlValue, Store, create_engine};
pub use query::Query;
pub use registry::Registry;
pub use schema::{Column, Record, RecordRef, Schema};
pub use session::Session;
