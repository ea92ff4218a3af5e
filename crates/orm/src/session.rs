//! The unit-of-work session.

use std::rc::Rc;
use std::sync::Arc;

use lodestone_store::{SqlValue, Store};

use crate::error::Result;
use crate::field::{FieldKind, Value};
use crate::query::Query;
use crate::schema::{Record, RecordRef, Schema};

/// Tracks pending record instances and flushes them as SQL DML.
///
/// An instance moves through `untracked → new → persisted ⇄ dirty` and
/// `persisted|dirty → deleted`; it belongs to at most one pending set at a
/// time, and membership changes only through [`Session::add`],
/// [`Session::update`], and [`Session::delete`]. The session owns the store
/// connection exclusively for its whole lifetime.
///
/// Single-threaded and blocking throughout: every flush issues store calls
/// one at a time, with no retry. A store failure propagates immediately and
/// leaves the not-yet-flushed instances pending.
pub struct Session {
    store: Store,
    new: Vec<RecordRef>,
    dirty: Vec<RecordRef>,
    deleted: Vec<RecordRef>,
}

impl Session {
    /// A session bound to a store connection, which it owns from here on.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self {
            store,
            new: Vec::new(),
            dirty: Vec::new(),
            deleted: Vec::new(),
        }
    }

    /// Stage an instance for the next flush.
    ///
    /// Instances whose primary-key column holds a value are staged *dirty*
    /// (they will be updated); everything else is staged *new* (they will be
    /// inserted). Zero and empty-string are assigned key values and route to
    /// *dirty* — only an absent or NULL key means "not yet persisted".
    pub fn add(&mut self, record: RecordRef) {
        self.untrack(&record);
        if has_primary_key_value(&record.borrow()) {
            self.dirty.push(record);
        } else {
            self.new.push(record);
        }
    }

    /// Stage several instances, preserving order.
    pub fn add_all(&mut self, records: impl IntoIterator<Item = RecordRef>) {
        for record in records {
            self.add(record);
        }
    }

    /// Apply field assignments to an instance and stage it *dirty*.
    ///
    /// # Errors
    ///
    /// Fails on undeclared columns or type mismatches; nothing is staged on
    /// failure.
    pub fn update(&mut self, record: &RecordRef, fields: &[(&str, Value)]) -> Result<()> {
        {
            let mut rec = record.borrow_mut();
            for (column, value) in fields {
                rec.set(column, value.clone())?;
            }
        }
        self.untrack(record);
        self.dirty.push(Rc::clone(record));
        Ok(())
    }

    /// Stage an instance for deletion.
    pub fn delete(&mut self, record: &RecordRef) {
        self.untrack(record);
        self.deleted.push(Rc::clone(record));
    }

    /// Translate every pending instance into executed DML, in the order
    /// new → dirty → deleted.
    ///
    /// Inserted instances with an unset integer primary key receive the
    /// store-generated identity. Each instance leaves its pending set as
    /// soon as its statement has executed, so a failure partway through
    /// leaves only the untouched remainder pending.
    ///
    /// # Errors
    ///
    /// Propagates the first store failure unchanged; statements already
    /// executed are not rolled back.
    pub fn flush(&mut self) -> Result<()> {
        while let Some(record) = self.new.first().map(Rc::clone) {
            self.insert_record(&record)?;
            self.new.remove(0);
        }
        while let Some(record) = self.dirty.first().map(Rc::clone) {
            self.update_record(&record)?;
            self.dirty.remove(0);
        }
        while let Some(record) = self.deleted.first().map(Rc::clone) {
            self.delete_record(&record)?;
            self.deleted.remove(0);
        }
        Ok(())
    }

    /// Flush, then commit the store transaction.
    ///
    /// # Errors
    ///
    /// Propagates flush or commit failures.
    pub fn commit(&mut self) -> Result<()> {
        self.flush()?;
        self.store.commit()?;
        Ok(())
    }

    /// Release the store connection, consuming the session.
    ///
    /// Pending instances are discarded, not flushed.
    ///
    /// # Errors
    ///
    /// Propagates the store close failure.
    pub fn close(self) -> Result<()> {
        self.store.close()?;
        Ok(())
    }

    /// Start a query scoped to one schema, executed through this session's
    /// store.
    #[must_use]
    pub fn query(&self, schema: &Arc<Schema>) -> Query<'_> {
        Query::new(&self.store, Arc::clone(schema))
    }

    /// Remove an instance from whichever pending set holds it.
    fn untrack(&mut self, record: &RecordRef) {
        self.new.retain(|r| !Rc::ptr_eq(r, record));
        self.dirty.retain(|r| !Rc::ptr_eq(r, record));
        self.deleted.retain(|r| !Rc::ptr_eq(r, record));
    }

    fn insert_record(&self, record: &RecordRef) -> Result<()> {
        let mut rec = record.borrow_mut();
        let schema = Arc::clone(rec.schema());

        let mut columns = Vec::new();
        let mut params = Vec::new();
        for column in schema.columns() {
            if let Some(raw) = rec.raw(column.name()) {
                if column.is_primary_key() && raw.is_null() {
                    continue;
                }
                columns.push(column.name());
                params.push(raw.clone());
            }
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", schema.table())
        } else {
            let placeholders = vec!["?"; columns.len()].join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                schema.table(),
                columns.join(", "),
                placeholders
            )
        };
        tracing::debug!(
            table = schema.table(),
            sql = %sql,
            param_count = params.len(),
            "flushing insert"
        );
        let cursor = self.store.execute(&sql, &params)?;

        // Write the store-generated identity back onto the instance.
        if let Some(pk) = schema.primary_key()
            && pk.kind() == FieldKind::Integer
            && rec.raw(pk.name()).is_none_or(SqlValue::is_null)
        {
            rec.set_raw(pk.name(), SqlValue::Integer(cursor.lastrowid));
        }
        Ok(())
    }

    fn update_record(&self, record: &RecordRef) -> Result<()> {
        let rec = record.borrow();
        let schema = rec.schema();

        let Some(pk) = schema.primary_key() else {
            tracing::warn!(
                table = schema.table(),
                "cannot update a record on a table without a primary key; dropping from session"
            );
            return Ok(());
        };
        let Some(pk_value) = rec.raw(pk.name()).filter(|raw| !raw.is_null()).cloned() else {
            tracing::warn!(
                table = schema.table(),
                "cannot update a record with an unset primary key; dropping from session"
            );
            return Ok(());
        };

        let mut sets = Vec::new();
        let mut params = Vec::new();
        for column in schema.columns() {
            if column.is_primary_key() {
                continue;
            }
            if let Some(raw) = rec.raw(column.name()) {
                sets.push(format!("{} = ?", column.name()));
                params.push(raw.clone());
            }
        }
        if sets.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            schema.table(),
            sets.join(", "),
            pk.name()
        );
        params.push(pk_value);
        tracing::debug!(
            table = schema.table(),
            sql = %sql,
            param_count = params.len(),
            "flushing update"
        );
        self.store.execute(&sql, &params)?;
        Ok(())
    }

    fn delete_record(&self, record: &RecordRef) -> Result<()> {
        let rec = record.borrow();
        let schema = rec.schema();

        let Some(pk) = schema.primary_key() else {
            tracing::warn!(
                table = schema.table(),
                "cannot delete a record on a table without a primary key; dropping from session"
            );
            return Ok(());
        };
        let Some(pk_value) = rec.raw(pk.name()).filter(|raw| !raw.is_null()).cloned() else {
            tracing::warn!(
                table = schema.table(),
                "cannot delete a record with an unset primary key; dropping from session"
            );
            return Ok(());
        };

        let sql = format!("DELETE FROM {} WHERE {} = ?", schema.table(), pk.name());
        tracing::debug!(table = schema.table(), sql = %sql, param_count = 1, "flushing delete");
        self.store.execute(&sql, &[pk_value])?;
        Ok(())
    }
}

/// Whether the record's primary-key column holds an assigned (non-NULL)
/// value.
fn has_primary_key_value(record: &Record) -> bool {
    record
        .schema()
        .primary_key()
        .is_some_and(|pk| record.raw(pk.name()).is_some_and(|raw| !raw.is_null()))
}
