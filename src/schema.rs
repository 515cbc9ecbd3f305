//! Schema snapshot: the live table list a translation is grounded in

use tracing::debug;

use crate::engine::{Database, TableName};
use crate::error::Result;

/// Table names captured for a single translation request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSnapshot {
    tables: Vec<TableName>,
}

impl SchemaSnapshot {
    /// Read the current table list from the database
    pub async fn capture<D: Database>(db: &D) -> Result<Self> {
        let tables = db.list_tables().await?;
        debug!(tables = tables.len(), "captured schema snapshot");
        Ok(Self { tables })
    }

    #[must_use]
    pub fn from_tables(tables: Vec<TableName>) -> Self {
        Self { tables }
    }

    #[must_use]
    pub fn tables(&self) -> &[TableName] {
        &self.tables
    }

    /// Table names joined into a comma list for the prompt
    #[must_use]
    pub fn table_list(&self) -> String {
        self.tables.iter().map(TableName::as_str).collect::<Vec<_>>().join(", ")
    }
}
