//! The fluent, schema-scoped query builder.

use std::fmt::Write as _;
use std::sync::Arc;

use lodestone_store::{SqlValue, Store};

use crate::error::{Error, Result};
use crate::field::Value;
use crate::filter::{ColumnRef, Filter, JoinOn, Order};
use crate::schema::{Record, Schema};

/// Builds and executes one SQL statement scoped to a single schema.
///
/// Directives accumulate through chained calls; compilation emits clauses in
/// a fixed order regardless of call order:
///
/// ```text
/// SELECT * FROM t [JOIN ...] [WHERE ...] [GROUP BY ...] [ORDER BY ...] [LIMIT n]
/// ```
///
/// The same trailing clause construction applies verbatim to the UPDATE and
/// DELETE forms. Filter values are always bound as positional parameters.
pub struct Query<'a> {
    store: &'a Store,
    schema: Arc<Schema>,
    filters: Vec<Filter>,
    joins: Vec<(Arc<Schema>, JoinOn)>,
    order: Vec<Order>,
    group: Vec<String>,
    limit: Option<u64>,
    assignments: Vec<(String, Value)>,
}

impl<'a> Query<'a> {
    pub(crate) fn new(store: &'a Store, schema: Arc<Schema>) -> Self {
        Self {
            store,
            schema,
            filters: Vec::new(),
            joins: Vec::new(),
            order: Vec::new(),
            group: Vec::new(),
            limit: None,
            assignments: Vec::new(),
        }
    }

    /// Append a filter expression. Filters are AND-combined in append order.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Equality shorthand: `filter_by("name", "Alice")` is
    /// `filter(Filter::eq("name", "Alice"))`. Chain for AND semantics.
    #[must_use]
    pub fn filter_by(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    /// Append an ORDER BY directive. Bare column names sort ascending.
    #[must_use]
    pub fn order_by(mut self, order: impl Into<Order>) -> Self {
        self.order.push(order.into());
        self
    }

    /// Append a GROUP BY column.
    #[must_use]
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group.push(column.into());
        self
    }

    /// Cap the number of rows returned.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Append a JOIN against another schema.
    ///
    /// Both sides of the predicate are schema-qualified; a predicate naming
    /// a table outside the query or an undeclared column fails at
    /// compilation.
    #[must_use]
    pub fn join(mut self, schema: &Arc<Schema>, on: JoinOn) -> Self {
        self.joins.push((Arc::clone(schema), on));
        self
    }

    /// Stage a SET assignment for [`Query::update`].
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assignments.push((column.into(), value.into()));
        self
    }

    /// Execute as SELECT and rehydrate every row into a record instance.
    ///
    /// # Errors
    ///
    /// Fails on undeclared filter/order/group columns, unresolvable join
    /// predicates, value conversion errors, or store failures.
    pub fn all(self) -> Result<Vec<Record>> {
        let (sql, params) = self.compile_select()?;
        let cursor = self.store.execute(&sql, &params)?;
        let columns = cursor.columns;
        let records = cursor
            .rows
            .into_iter()
            .map(|row| Record::from_row(&self.schema, &columns, row))
            .collect();
        Ok(records)
    }

    /// Execute with `LIMIT 1` and return the first row, if any.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Query::all`].
    pub fn first(self) -> Result<Option<Record>> {
        let mut rows = self.limit(1).all()?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// Execute the full result set and return the final row, if any.
    ///
    /// Fetches everything rather than reversing the ordering; callers with
    /// large result sets should order descending and use [`Query::first`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Query::all`].
    pub fn last(self) -> Result<Option<Record>> {
        let mut rows = self.all()?;
        Ok(rows.pop())
    }

    /// Execute as UPDATE using the staged [`Query::set`] assignments.
    /// Returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EmptyUpdate`] when nothing was staged, plus the
    /// conditions of [`Query::all`].
    pub fn update(self) -> Result<usize> {
        let (sql, params) = self.compile_update()?;
        let cursor = self.store.execute(&sql, &params)?;
        Ok(cursor.rows_affected)
    }

    /// Execute as DELETE. Returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Query::all`].
    pub fn delete(self) -> Result<usize> {
        let (sql, params) = self.compile_delete()?;
        let cursor = self.store.execute(&sql, &params)?;
        Ok(cursor.rows_affected)
    }

    fn compile_select(&self) -> Result<(String, Vec<SqlValue>)> {
        let mut sql = format!("SELECT * FROM {}", self.schema.table());
        let mut params = Vec::new();
        self.push_clauses(&mut sql, &mut params)?;

        tracing::debug!(
            table = self.schema.table(),
            sql = %sql,
            param_count = params.len(),
            "compiled SELECT"
        );
        Ok((sql, params))
    }

    fn compile_update(&self) -> Result<(String, Vec<SqlValue>)> {
        if self.assignments.is_empty() {
            return Err(Error::EmptyUpdate);
        }

        let mut sql = format!("UPDATE {} SET ", self.schema.table());
        let mut params = Vec::new();
        for (i, (column, value)) in self.assignments.iter().enumerate() {
            let binding = self.schema.expect_column(column)?;
            if i > 0 {
                sql.push_str(", ");
            }
            let _ = write!(sql, "{} = ?", binding.name());
            params.push(binding.kind().to_storage(value)?);
        }
        self.push_clauses(&mut sql, &mut params)?;

        tracing::debug!(
            table = self.schema.table(),
            sql = %sql,
            param_count = params.len(),
            "compiled UPDATE"
        );
        Ok((sql, params))
    }

    fn compile_delete(&self) -> Result<(String, Vec<SqlValue>)> {
        let mut sql = format!("DELETE FROM {}", self.schema.table());
        let mut params = Vec::new();
        self.push_clauses(&mut sql, &mut params)?;

        tracing::debug!(
            table = self.schema.table(),
            sql = %sql,
            param_count = params.len(),
            "compiled DELETE"
        );
        Ok((sql, params))
    }

    /// Append JOIN/WHERE/GROUP BY/ORDER BY/LIMIT in the fixed clause order.
    fn push_clauses(&self, sql: &mut String, params: &mut Vec<SqlValue>) -> Result<()> {
        for (schema, on) in &self.joins {
            let left = self.resolve_join_column(&on.left)?;
            let right = self.resolve_join_column(&on.right)?;
            let _ = write!(
                sql,
                " JOIN {} ON {left} {} {right}",
                schema.table(),
                on.op.as_sql()
            );
        }

        for (i, filter) in self.filters.iter().enumerate() {
            let binding = self.schema.expect_column(&filter.column)?;
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            let _ = write!(sql, "{} {} ?", binding.name(), filter.op.as_sql());
            params.push(binding.kind().to_storage(&filter.value)?);
        }

        for (i, column) in self.group.iter().enumerate() {
            let binding = self.schema.expect_column(column)?;
            sql.push_str(if i == 0 { " GROUP BY " } else { ", " });
            sql.push_str(binding.name());
        }

        for (i, order) in self.order.iter().enumerate() {
            let binding = self.schema.expect_column(&order.column)?;
            sql.push_str(if i == 0 { " ORDER BY " } else { ", " });
            let _ = write!(
                sql,
                "{} {}",
                binding.name(),
                if order.descending { "DESC" } else { "ASC" }
            );
        }

        if let Some(limit) = self.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }

        Ok(())
    }

    /// Resolve one side of a join predicate to `table.column` text.
    ///
    /// The referenced table must be the base schema or one of the joined
    /// schemas, and must declare the column.
    fn resolve_join_column(&self, column_ref: &ColumnRef) -> Result<String> {
        let schema = if self.schema.table() == column_ref.table {
            &self.schema
        } else {
            self.joins
                .iter()
                .map(|(schema, _)| schema)
                .find(|schema| schema.table() == column_ref.table)
                .ok_or_else(|| Error::UnknownJoinTable {
                    table: column_ref.table.clone(),
                })?
        };
        let binding = schema.expect_column(&column_ref.column)?;
        Ok(format!("{}.{}", schema.table(), binding.name()))
    }
}
