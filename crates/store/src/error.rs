//! Error types for the store.

use thiserror::Error;

/// Errors surfaced by the store.
#[derive(Debug, Error)]
pub enum Error {
    /// The connection string does not use the `sqlite://` scheme.
    #[error("unsupported connection scheme in `{0}`: expected `sqlite://`")]
    UnsupportedScheme(String),

    /// A text column held bytes that are not valid UTF-8.
    #[error("invalid UTF-8 in text value: {0}")]
    InvalidText(#[from] std::str::Utf8Error),

    /// An underlying SQLite failure, propagated unchanged.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Store result type.
pub type Result<T> = std::result::Result<T, Error>;
