//! Error types for the mapping layer.

use thiserror::Error;

/// Errors surfaced by schema declaration, record access, and queries.
#[derive(Debug, Error)]
pub enum Error {
    /// A column name that the record's schema does not declare.
    #[error("unknown column `{column}` on table `{table}`")]
    UnknownColumn {
        /// Table the lookup was scoped to.
        table: String,
        /// The undeclared column name.
        column: String,
    },

    /// The same column name declared twice on one schema.
    #[error("duplicate column `{column}` on table `{table}`")]
    DuplicateColumn {
        /// Table being declared.
        table: String,
        /// The repeated column name.
        column: String,
    },

    /// More than one column flagged as the primary key.
    #[error("table `{table}` declares more than one primary key column")]
    MultiplePrimaryKeys {
        /// Table being declared.
        table: String,
    },

    /// The same table name registered twice.
    #[error("table `{table}` is already registered")]
    DuplicateTable {
        /// The repeated table name.
        table: String,
    },

    /// A host value that does not fit the column's field type.
    #[error("type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        /// The field type's expected representation.
        expected: &'static str,
        /// Description of the value that was supplied.
        found: String,
    },

    /// A stored date that is not `%Y-%m-%d` text.
    #[error("unsupported date `{0}`: expected \"%Y-%m-%d\" format")]
    InvalidDate(String),

    /// A stored timestamp that is not `%Y-%m-%d %H:%M:%S%.f` text.
    #[error("unsupported timestamp `{0}`: expected \"%Y-%m-%d %H:%M:%S%.f\" format")]
    InvalidTimestamp(String),

    /// A join predicate naming a table that is not part of the query.
    #[error("join references table `{table}` which is not part of the query")]
    UnknownJoinTable {
        /// The unresolved table name.
        table: String,
    },

    /// A query-level update with no SET assignments.
    #[error("update requires at least one SET assignment")]
    EmptyUpdate,

    /// A store-level failure, propagated unchanged.
    #[error(transparent)]
    Store(#[from] lodestone_store::Error),
}

/// Mapping-layer result type.
pub type Result<T> = std::result::Result<T, Error>;
