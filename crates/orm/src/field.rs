//! Field types and the conversions between host and storage values.

use chrono::{NaiveDate, NaiveDateTime};
use lodestone_store::SqlValue;

use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A host-typed scalar held by a record.
///
/// Callers work exclusively with these; the wire encoding (booleans as 0/1
/// integers, dates and timestamps as ISO-8601 text) never leaks out of the
/// conversion layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unset or SQL NULL.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// Text, for both `String` and `Text` columns.
    Text(String),
    /// Boolean.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time, no timezone.
    Timestamp(NaiveDateTime),
}

impl Value {
    /// True for the NULL variant.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The integer payload, if any.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The text payload, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean payload, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The date payload, if any.
    #[must_use]
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// The timestamp payload, if any.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Integer(i) => format!("integer {i}"),
            Self::Text(s) => format!("text `{s}`"),
            Self::Bool(b) => format!("boolean {b}"),
            Self::Date(d) => format!("date {d}"),
            Self::Timestamp(ts) => format!("timestamp {ts}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

/// The scalar kinds a column can be declared with.
///
/// Each kind is a conversion pair between [`Value`] and the store's
/// [`SqlValue`]; adding a kind means implementing that pair and nothing
/// else. The enum is closed, so the SQL type mapping below is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 64-bit integer, stored as INTEGER.
    Integer,
    /// Short text, stored as VARCHAR.
    String,
    /// Long text, stored as TEXT.
    Text,
    /// Boolean, stored as a 0/1 INTEGER in a BOOLEAN column.
    Boolean,
    /// Calendar date, stored as `%Y-%m-%d` text in a DATE column.
    Date,
    /// Timestamp, stored as `%Y-%m-%d %H:%M:%S%.f` text in a DATETIME column.
    Timestamp,
}

impl FieldKind {
    /// The SQL column type emitted for this kind in DDL.
    #[must_use]
    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::String => "VARCHAR",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Timestamp => "DATETIME",
        }
    }

    /// Convert a stored raw value into a host value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the raw value has the wrong
    /// storage class, or a parse error for malformed date/timestamp text.
    pub fn to_host(self, raw: &SqlValue) -> Result<Value> {
        if raw.is_null() {
            return Ok(Value::Null);
        }
        match self {
            Self::Integer => match raw {
                SqlValue::Integer(i) => Ok(Value::Integer(*i)),
                other => Err(mismatch("integer", other)),
            },
            Self::String | Self::Text => match raw {
                SqlValue::Text(s) => Ok(Value::Text(s.clone())),
                other => Err(mismatch("text", other)),
            },
            Self::Boolean => match raw {
                SqlValue::Integer(i) => Ok(Value::Bool(*i != 0)),
                other => Err(mismatch("0/1 integer", other)),
            },
            Self::Date => match raw {
                SqlValue::Text(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .map(Value::Date)
                    .map_err(|_e| Error::InvalidDate(s.clone())),
                other => Err(mismatch("date text", other)),
            },
            Self::Timestamp => match raw {
                SqlValue::Text(s) => NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
                    .map(Value::Timestamp)
                    .map_err(|_e| Error::InvalidTimestamp(s.clone())),
                other => Err(mismatch("timestamp text", other)),
            },
        }
    }

    /// Convert a host value into its storage representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the host value does not belong to
    /// this kind.
    pub fn to_storage(self, value: &Value) -> Result<SqlValue> {
        if value.is_null() {
            return Ok(SqlValue::Null);
        }
        match self {
            Self::Integer => match value {
                Value::Integer(i) => Ok(SqlValue::Integer(*i)),
                other => Err(host_mismatch("an integer", other)),
            },
            Self::String | Self::Text => match value {
                Value::Text(s) => Ok(SqlValue::Text(s.clone())),
                other => Err(host_mismatch("text", other)),
            },
            Self::Boolean => match value {
                Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
                other => Err(host_mismatch("a boolean", other)),
            },
            Self::Date => match value {
                Value::Date(d) => Ok(SqlValue::Text(d.format(DATE_FORMAT).to_string())),
                other => Err(host_mismatch("a date", other)),
            },
            Self::Timestamp => match value {
                Value::Timestamp(ts) => {
                    Ok(SqlValue::Text(ts.format(TIMESTAMP_FORMAT).to_string()))
                }
                other => Err(host_mismatch("a timestamp", other)),
            },
        }
    }
}

fn mismatch(expected: &'static str, found: &SqlValue) -> Error {
    Error::TypeMismatch {
        expected,
        found: format!("{found:?}"),
    }
}

fn host_mismatch(expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        expected,
        found: found.describe(),
    }
}
