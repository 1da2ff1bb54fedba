//! SQLite-backed data store.

use std::path::PathBuf;

use release_ingest::DelimitedTable;
use release_model::ColumnSelection;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::store::{DataStore, SchemaSource};

/// Read-only access to a SQLite research database.
///
/// A connection is opened per operation and dropped when it completes.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn connect(&self) -> Result<Connection> {
        if !self.path.is_file() {
            return Err(ExportError::DatabaseNotFound {
                path: self.path.clone(),
            });
        }
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| ExportError::Open {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl SchemaSource for SqliteStore {
    fn table_names(&self) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let list_err = |e: rusqlite::Error| ExportError::ListTables { source: e };
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .map_err(list_err)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(list_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(list_err)?;
        Ok(names)
    }

    fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let list_err = |e: rusqlite::Error| ExportError::ListColumns {
            table: table.to_string(),
            source: e,
        };
        let mut stmt = conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(list_err)?;
        let columns = stmt
            .query_map([table], |row| row.get::<_, String>(0))
            .map_err(list_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(list_err)?;
        if columns.is_empty() {
            return Err(ExportError::TableNotFound {
                table: table.to_string(),
            });
        }
        Ok(columns)
    }
}

impl DataStore for SqliteStore {
    fn fetch(&self, table: &str, columns: &ColumnSelection) -> Result<DelimitedTable> {
        let conn = self.connect()?;
        let sql = projection_sql(table, columns);
        debug!(%sql, "running export query");

        let query_err = |e: rusqlite::Error| ExportError::Query {
            table: table.to_string(),
            source: e,
        };
        let mut stmt = conn.prepare(&sql).map_err(query_err)?;
        let headers: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let width = headers.len();

        let mut output = Vec::new();
        let mut rows = stmt.query([]).map_err(query_err)?;
        while let Some(row) = rows.next().map_err(query_err)? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(render_value(row.get_ref(idx).map_err(query_err)?));
            }
            output.push(values);
        }
        Ok(DelimitedTable::new(headers, output))
    }
}

fn projection_sql(table: &str, columns: &ColumnSelection) -> String {
    match columns {
        ColumnSelection::All => format!("SELECT * FROM {}", quote_identifier(table)),
        ColumnSelection::Columns(names) => {
            let projected: Vec<String> = names.iter().map(|n| quote_identifier(n)).collect();
            format!(
                "SELECT {} FROM {}",
                projected.join(", "),
                quote_identifier(table)
            )
        }
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) if v.is_finite() && v.fract() == 0.0 => format!("{v:.1}"),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => hex::encode(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_identifier("visit name"), "\"visit name\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn projection_lists_selected_columns() {
        let sql = projection_sql(
            "esm",
            &ColumnSelection::Columns(vec!["participant_identifier".into(), "mood".into()]),
        );
        assert_eq!(
            sql,
            "SELECT \"participant_identifier\", \"mood\" FROM \"esm\""
        );
        assert_eq!(
            projection_sql("esm", &ColumnSelection::All),
            "SELECT * FROM \"esm\""
        );
    }

    #[test]
    fn values_render_as_text() {
        assert_eq!(render_value(ValueRef::Null), "");
        assert_eq!(render_value(ValueRef::Integer(3)), "3");
        assert_eq!(render_value(ValueRef::Real(2.0)), "2.0");
        assert_eq!(render_value(ValueRef::Real(2.5)), "2.5");
        assert_eq!(render_value(ValueRef::Text(b"T1")), "T1");
        assert_eq!(render_value(ValueRef::Blob(&[0xab, 0x01])), "ab01");
    }
}
