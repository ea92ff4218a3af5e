//! Record schemas, column bindings, and record instances.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use lodestone_store::SqlValue;

use crate::error::{Error, Result};
use crate::field::{FieldKind, Value};

/// One persisted attribute: a name, its field type, and the primary-key flag.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    kind: FieldKind,
    primary_key: bool,
}

impl Column {
    /// Declare a column.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            primary_key: false,
        }
    }

    /// Mark this column as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// The column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column's field type.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether this column is the primary key.
    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.primary_key
    }
}

/// A declared record type: a table name plus its ordered column bindings.
///
/// Immutable after declaration and shared as `Arc<Schema>` by every record
/// instance, session, and query that touches the table.
#[derive(Debug)]
pub struct Schema {
    table: String,
    columns: Vec<Column>,
}

impl Schema {
    /// Declare a schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateColumn`] if a column name repeats and
    /// [`Error::MultiplePrimaryKeys`] if more than one column carries the
    /// primary-key flag.
    pub fn new(table: impl Into<String>, columns: Vec<Column>) -> Result<Arc<Self>> {
        let table = table.into();

        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(Error::DuplicateColumn {
                    table,
                    column: column.name.clone(),
                });
            }
        }
        if columns.iter().filter(|c| c.primary_key).count() > 1 {
            return Err(Error::MultiplePrimaryKeys { table });
        }

        Ok(Arc::new(Self { table, columns }))
    }

    /// The table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The ordered column bindings.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a binding by column name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The primary-key binding, if one is declared.
    #[must_use]
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub(crate) fn expect_column(&self, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| Error::UnknownColumn {
            table: self.table.clone(),
            column: name.to_string(),
        })
    }

    /// The `CREATE TABLE IF NOT EXISTS` statement for this schema.
    #[must_use]
    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                if c.primary_key {
                    format!("{} {} PRIMARY KEY", c.name, c.kind.sql_type())
                } else {
                    format!("{} {}", c.name, c.kind.sql_type())
                }
            })
            .collect();
        format!("CREATE TABLE IF NOT EXISTS {} ({})", self.table, columns.join(", "))
    }
}

/// Shared handle to a record instance.
///
/// A caller and a session's pending sets reference the same instance
/// through this handle, so a primary key assigned during flush is visible
/// to the caller. Single-threaded by design.
pub type RecordRef = Rc<RefCell<Record>>;

/// One row's worth of typed values, bound to a schema.
///
/// Values are held in their storage representation; [`Record::get`] converts
/// to the host type on every read and [`Record::set`] converts back on every
/// write, so callers only ever see host-typed [`Value`]s.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    values: BTreeMap<String, SqlValue>,
}

impl Record {
    /// An empty instance of the schema. All columns start unset.
    #[must_use]
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            values: BTreeMap::new(),
        }
    }

    /// Chainable fallible seeding for constructor-style initialization.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Record::set`].
    pub fn try_with(mut self, column: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(column, value)?;
        Ok(self)
    }

    /// The schema this instance belongs to.
    #[must_use]
    pub const fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Read a column as a host value. Unset columns read as [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] for undeclared names, or a
    /// conversion error if the stored raw value is malformed.
    pub fn get(&self, column: &str) -> Result<Value> {
        let binding = self.schema.expect_column(column)?;
        self.values
            .get(column)
            .map_or(Ok(Value::Null), |raw| binding.kind().to_host(raw))
    }

    /// Write a column from a host value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] for undeclared names or
    /// [`Error::TypeMismatch`] if the value does not fit the field type.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<()> {
        let binding = self.schema.expect_column(column)?;
        let raw = binding.kind().to_storage(&value.into())?;
        self.values.insert(binding.name().to_string(), raw);
        Ok(())
    }

    /// Whether the column holds a non-NULL value.
    #[must_use]
    pub fn is_set(&self, column: &str) -> bool {
        self.values.get(column).is_some_and(|raw| !raw.is_null())
    }

    /// Wrap this instance in a shared handle for session tracking.
    #[must_use]
    pub fn into_ref(self) -> RecordRef {
        Rc::new(RefCell::new(self))
    }

    pub(crate) fn raw(&self, column: &str) -> Option<&SqlValue> {
        self.values.get(column)
    }

    pub(crate) fn set_raw(&mut self, column: &str, raw: SqlValue) {
        self.values.insert(column.to_string(), raw);
    }

    /// Rehydrate an instance from a result row, matching result columns by
    /// name against the schema's bindings. The first occurrence of a name
    /// wins; columns the schema does not declare are ignored.
    pub(crate) fn from_row(schema: &Arc<Schema>, columns: &[String], row: Vec<SqlValue>) -> Self {
        let mut record = Self::new(schema);
        for (name, raw) in columns.iter().zip(row) {
            if schema.column(name).is_some() && !record.values.contains_key(name) {
                record.values.insert(name.clone(), raw);
            }
        }
        record
    }
}
