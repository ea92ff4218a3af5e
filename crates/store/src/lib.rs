//! Embedded SQLite store for the lodestone ORM.
//!
//! The store executes parameterized SQL against a single SQLite connection
//! and hands results back as plain [`Cursor`] values. It knows nothing about
//! schemas or records; the mapping layer in `lodestone-orm` owns those.
//!
//! ```no_run
//! use lodestone_store::{SqlValue, create_engine};
//!
//! let store = create_engine("sqlite://:memory:")?;
//! store.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR)", &[])?;
//! store.execute(
//!     "INSERT INTO users (name) VALUES (?)",
//!     &[SqlValue::Text("Alice".to_string())],
//! )?;
//! store.commit()?;
//! # Ok::<(), lodestone_store::Error>(())
//! ```
//!
//! Transaction handling follows the embedded-database convention: the first
//! INSERT/UPDATE/DELETE opens a deferred transaction, and [`Store::commit`]
//! ends it. DDL and SELECT statements run in autocommit mode.

mod error;
mod value;

use rusqlite::{Connection, params_from_iter};

pub use crate::error::{Error, Result};
pub use crate::value::SqlValue;

/// Create a store from a connection string.
///
/// Only the `sqlite://` scheme is recognized. `sqlite://:memory:` (or an
/// empty remainder) opens an in-memory database; anything else is a
/// filesystem path.
///
/// # Errors
///
/// Returns [`Error::UnsupportedScheme`] for any other scheme, or the
/// underlying SQLite error if the database cannot be opened.
pub fn create_engine(url: &str) -> Result<Store> {
    let Some(database) = url.strip_prefix("sqlite://") else {
        return Err(Error::UnsupportedScheme(url.to_string()));
    };
    // `sqlite:///path` and `sqlite://path` are equivalent
    let database = database.strip_prefix('/').unwrap_or(database);

    tracing::debug!("opening SQLite database: {database}");
    let conn = if database.is_empty() || database == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(database)?
    };

    Ok(Store { conn })
}

/// A single exclusively-owned SQLite connection.
///
/// Every operation is synchronous and blocking. The store is not meant to be
/// shared across threads; a session owns it for its whole lifetime.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Execute one SQL statement with positionally-bound parameters.
    ///
    /// Statements that produce columns (SELECT) fill the cursor's rows;
    /// anything else returns an empty row set with the affected-row count.
    ///
    /// # Errors
    ///
    /// Propagates SQLite failures (malformed SQL, constraint violations)
    /// unchanged. No retry is attempted.
    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<Cursor> {
        tracing::debug!("executing: {sql}");

        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();

        // Only after the statement is known to be well-formed; a failed
        // prepare must not leave an empty transaction open.
        if is_dml(sql) && self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }

        if columns.is_empty() {
            let rows_affected = stmt.execute(params_from_iter(params.iter()))?;
            drop(stmt);
            return Ok(Cursor {
                columns,
                rows: Vec::new(),
                lastrowid: self.conn.last_insert_rowid(),
                rows_affected,
            });
        }

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut result_rows = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                cells.push(SqlValue::from_value_ref(row.get_ref(i)?)?);
            }
            result_rows.push(cells);
        }
        drop(rows);
        drop(stmt);

        let rows_affected = result_rows.len();
        Ok(Cursor {
            columns,
            rows: result_rows,
            lastrowid: self.conn.last_insert_rowid(),
            rows_affected,
        })
    }

    /// Commit the open transaction, if any.
    ///
    /// # Errors
    ///
    /// Propagates the SQLite error if the commit fails.
    pub fn commit(&self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    /// Close the connection, consuming the store.
    ///
    /// # Errors
    ///
    /// Returns the SQLite error if the connection cannot be closed cleanly.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Sqlite(e))
    }
}

/// The result of one executed statement.
#[derive(Debug)]
pub struct Cursor {
    /// Ordered result column names.
    pub columns: Vec<String>,
    /// Fetched rows, one `SqlValue` per result column.
    pub rows: Vec<Vec<SqlValue>>,
    /// Identity assigned by the most recent INSERT on this connection.
    pub lastrowid: i64,
    /// Rows changed by DML, or the fetched row count for SELECT.
    pub rows_affected: usize,
}

/// Statements that participate in the implicit transaction.
fn is_dml(sql: &str) -> bool {
    let verb = sql.trim_start().split_whitespace().next().unwrap_or("");
    verb.eq_ignore_ascii_case("INSERT")
        || verb.eq_ignore_ascii_case("UPDATE")
        || verb.eq_ignore_ascii_case("DELETE")
        || verb.eq_ignore_ascii_case("REPLACE")
}
