//! Read-only data store seam.

use release_ingest::DelimitedTable;
use release_model::ColumnSelection;

use crate::error::Result;

/// Live schema: table names and their columns in storage order.
pub trait SchemaSource {
    fn table_names(&self) -> Result<Vec<String>>;

    fn column_names(&self, table: &str) -> Result<Vec<String>>;
}

/// A schema that can also answer projection queries.
pub trait DataStore: SchemaSource {
    /// Runs `SELECT <columns> FROM <table>` and returns the full result set,
    /// values rendered as text.
    fn fetch(&self, table: &str, columns: &ColumnSelection) -> Result<DelimitedTable>;
}
