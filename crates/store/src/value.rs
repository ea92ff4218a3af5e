//! Wire-typed scalar values exchanged with SQLite.

use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, Value as RusqliteValue, ValueRef};

use crate::error::Result;

/// A scalar in the store's representation.
///
/// Variants mirror SQLite's storage classes. Higher-level types (booleans,
/// dates, timestamps) are encoded into these by the mapping layer before
/// they reach the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Decode a value from a result row cell.
    pub(crate) fn from_value_ref(value: ValueRef<'_>) -> Result<Self> {
        let value = match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(f) => Self::Real(f),
            ValueRef::Text(bytes) => Self::Text(std::str::from_utf8(bytes)?.to_string()),
            ValueRef::Blob(bytes) => Self::Blob(bytes.to_vec()),
        };
        Ok(value)
    }

    /// True for the NULL variant.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let output = match self {
            Self::Null => ToSqlOutput::Owned(RusqliteValue::Null),
            Self::Integer(i) => ToSqlOutput::Owned(RusqliteValue::Integer(*i)),
            Self::Real(f) => ToSqlOutput::Owned(RusqliteValue::Real(*f)),
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Self::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        };
        Ok(output)
    }
}
