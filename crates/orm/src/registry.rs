//! Explicit registry of declared schemas.

use std::sync::Arc;

use lodestone_store::Store;

use crate::error::{Error, Result};
use crate::schema::Schema;

/// Collects declared schemas and materializes their tables.
///
/// Registration is explicit and ordered; there is no global state. Callers
/// register every schema they intend to persist, then call
/// [`Registry::create_all`] once before using a session or query against
/// those tables.
#[derive(Debug, Default)]
pub struct Registry {
    schemas: Vec<Arc<Schema>>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            schemas: Vec::new(),
        }
    }

    /// Register a schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTable`] if a schema with the same table
    /// name is already registered.
    pub fn register(&mut self, schema: Arc<Schema>) -> Result<Arc<Schema>> {
        if self.schemas.iter().any(|s| s.table() == schema.table()) {
            return Err(Error::DuplicateTable {
                table: schema.table().to_string(),
            });
        }
        self.schemas.push(Arc::clone(&schema));
        Ok(schema)
    }

    /// The registered schemas, in registration order.
    #[must_use]
    pub fn schemas(&self) -> &[Arc<Schema>] {
        &self.schemas
    }

    /// Emit `CREATE TABLE IF NOT EXISTS` for every registered schema.
    ///
    /// Idempotent; safe to call on every startup. Must run before any
    /// session flush or query touches the registered tables.
    ///
    /// # Errors
    ///
    /// Propagates store-level failures.
    pub fn create_all(&self, store: &Store) -> Result<()> {
        for schema in &self.schemas {
            let sql = schema.create_sql();
            tracing::debug!(table = schema.table(), sql = %sql, "creating table");
            store.execute(&sql, &[])?;
        }
        Ok(())
    }
}
